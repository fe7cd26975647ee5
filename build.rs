// build.rs: platform detection for qatcodec.
//
// Emits `cargo:rustc-cfg=has_dladdr` on targets whose libc exposes `dladdr`,
// which is how the loader reports the resolved path of libqatzip. Elsewhere
// the configured library file name is reported instead.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let dladdr_targets = [
        "linux",
        "android",
        "macos",
        "ios",
        "freebsd",
        "netbsd",
        "openbsd",
        "dragonfly",
        "solaris",
        "illumos",
    ];
    if dladdr_targets.contains(&target_os.as_str()) {
        println!("cargo:rustc-cfg=has_dladdr");
    }
}
