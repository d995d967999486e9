#![allow(clippy::exit)]
fn main() {
    // Host builds (unit tests, docs) link against std and must not see the
    // firmware linker scripts.
    if std::env::var_os("CARGO_FEATURE_ESP32S3").is_none() {
        return;
    }

    if std::env::var("PROFILE").as_deref() == Ok("release") {
        println!("cargo:rustc-env=DEFMT_LOG=off");
    }

    link_hints();
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

/// Registers this script as the linker's error handler. When re-run by the
/// linker it explains the undefined symbols a Core S3 firmware build hits
/// when a runtime piece is missing.
fn link_hints() {
    let mut args = std::env::args().skip(1);
    if let Some(kind) = args.next() {
        if kind != "undefined-symbol" {
            std::process::exit(1);
        }
        let symbol = args.next().unwrap_or_default();
        let hint = match symbol.as_str() {
            "_defmt_timestamp" | "_defmt_acquire" | "_defmt_write" => Some(
                "no defmt logger: enable esp-println's `defmt-espflash` feature and add `use esp_println as _;`",
            ),
            "_stack_start" => Some("`linkall.x` is not among the linker scripts"),
            "esp_rtos_initialized" | "esp_rtos_yield_task" | "esp_rtos_task_create" => Some(
                "the scheduler is not running: call `esp_rtos::start` before bringing the board up",
            ),
            _ => None,
        };
        if let Some(hint) = hint {
            eprintln!();
            eprintln!("m5stack-bsp: {hint}");
            eprintln!();
        }
        std::process::exit(0);
    }

    if let Ok(exe) = std::env::current_exe() {
        println!(
            "cargo:rustc-link-arg=-Wl,--error-handling-script={}",
            exe.display()
        );
    }
}
