pub const LABSIM_DISPLAY_VERSION: &str = env!("LABSIM_DISPLAY_VERSION");
pub const LABSIM_BUILD_N: &str = env!("LABSIM_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "labsim {}\nBuild {}\nVirtual lab inventory and digest engine",
        LABSIM_DISPLAY_VERSION, LABSIM_BUILD_N
    )
}
