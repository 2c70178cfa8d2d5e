#![no_main]
use leveler_core::{Plan, StepSize, plan_correction};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (f32, f32)| {
    let (z, tol) = input;
    if !(tol.is_finite() && tol > 0.0) {
        return;
    }
    match plan_correction(z, tol) {
        Plan::InvalidSample => assert!(!z.is_finite()),
        Plan::Hold => assert!(z.abs() <= tol),
        Plan::Turn { direction, step } => {
            assert!(z.abs() > tol);
            assert_eq!(direction, z > tol);
            if step == StepSize::Small {
                assert!(z.abs() < 2.0 * tol);
            }
        }
    }
});
