#![no_main]
use bsv_frame::{Decoder, Kind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut dec = Decoder::new(data);

    while dec.next() {
        match dec.kind() {
            Some(Kind::Data)
            | Some(Kind::Data1)
            | Some(Kind::Data2)
            | Some(Kind::DataSize)
            | Some(Kind::DataSizeSize) => {
                let _ = dec.data();
            }
            Some(Kind::ContainerBounded) => {
                let _ = dec.bsv();
            }
            Some(Kind::ContainerUnbounded) | Some(Kind::ContainerSymmetric) => {
                let _ = dec.enter();
            }
            Some(Kind::SkipSize) => {
                let _ = dec.amount();
            }
            _ => {}
        }
    }
});
