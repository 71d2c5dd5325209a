fn main() {
    use std::env;

    // Mirrors the backend selection in src/sys.rs: every unix target except
    // Apple's links the POSIX shim, so the same predicate decides whether to
    // compile it. Apple targets go through GCD dispatch sources instead.
    let unix = env::var("CARGO_CFG_UNIX").is_ok();
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if unix && target_os != "macos" && target_os != "ios" {
        println!("cargo:rerun-if-changed=src/sys/posix.c");
        cc::Build::new()
            .file("src/sys/posix.c")
            .compile("kestrel_timer_posix");
    }
}
