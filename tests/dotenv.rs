// Changes the working directory, so it lives in its own test binary.

use tempfile::TempDir;

#[test]
fn dotenv_loads_env_from_the_current_directory() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join(".env"), "A=from_cwd\n").expect("failed to write fixture file");
    std::env::set_current_dir(dir.path()).expect("failed to change directory");

    let env = withenv::dotenv().expect("load should succeed");

    assert_eq!(env.get("A"), Some("from_cwd"));
    assert_eq!(env.report().files_read, 1);
}
