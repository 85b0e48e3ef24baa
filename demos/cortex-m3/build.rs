
use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

// 把 LM3S6965 的内存布局交给 cortex-m-rt 的 link.x
fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    println!("cargo:rerun-if-changed=build.rs");
    if target == "thumbv7m-none-eabi" {
        let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
        File::create(out.join("memory.x"))
            .unwrap()
            .write_all(include_bytes!("memory.x"))
            .unwrap();
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rerun-if-changed=memory.x");
        println!("cargo:rustc-link-arg=--nmagic");
        println!("cargo:rustc-link-arg=-Tlink.x");
    } else {
        println!("cargo:warning=非ARM目标，跳过链接脚本: {}", target);
    }
}
