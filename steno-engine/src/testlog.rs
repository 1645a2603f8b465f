//! Test-only logging setup.

pub fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}
