fn main() {
    println!("cargo:rustc-check-cfg=cfg(statm_resident)");
    if std::env::var("CARGO_CFG_TARGET_OS")
        .map(|target| target == "linux")
        .unwrap_or(false)
    {
        println!("cargo:rustc-cfg=statm_resident");
    }
}
