#![no_main]
use jag_physics::executor::{step_kernel, StepFrame};
use libfuzzer_sys::fuzz_target;

// Raw bytes, copied into an aligned frame or passed through as-is, must
// either be rejected or stepped without panicking.
fuzz_target!(|data: &[u8]| {
    let mut raw = data.to_vec();
    step_kernel(&mut raw);

    let mut frame = StepFrame::new();
    let bytes = frame.as_bytes_mut();
    let n = data.len().min(bytes.len());
    bytes[..n].copy_from_slice(&data[..n]);
    step_kernel(frame.as_bytes_mut());
    assert!(frame.contacts().len() <= jag_physics::MAX_CONTACTS);
});
