use crate::{config::Config, loader::LoadReport};
use serde::Serialize;
use sysinfo::System;

#[derive(Serialize, Debug)]
pub struct SystemInfo {
    pub version: String,
    pub platform: String,
    pub arch: String,
    pub cpus: usize,
    pub cpu_model: String,
    pub memory_total_gb: f64,
    pub memory_free_gb: f64,
}

pub fn get_system_info() -> SystemInfo {
    let mut system = System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let gib = 1024.0 * 1024.0 * 1024.0;
    let cpu_model = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    SystemInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpus: system.cpus().len(),
        cpu_model,
        memory_total_gb: system.total_memory() as f64 / gib,
        memory_free_gb: system.free_memory() as f64 / gib,
    }
}

pub fn print_startup_info(config: &Config) {
    let sys_info = get_system_info();

    println!("{}", "=".repeat(60));
    println!("🚀 Movie Catalog v{} Starting...", sys_info.version);
    println!("{}", "=".repeat(60));
    println!("📊 System Information:");
    println!("  Platform: {} ({})", sys_info.platform, sys_info.arch);
    println!("  CPUs: {} ({})", sys_info.cpus, sys_info.cpu_model);
    println!(
        "  Memory: {:.2} GB total, {:.2} GB free",
        sys_info.memory_total_gb, sys_info.memory_free_gb
    );
    println!("  Backup File: {:?}", config.backup_file_path);
    println!("  Images Dir: {:?}", config.images_dir);
    println!("  Load Concurrency: {}", config.load_concurrency);
    println!("{}", "=".repeat(60));
}

pub fn print_ready_info(config: &Config, report: &LoadReport) {
    println!("{}", "=".repeat(60));
    println!("✅ Server running on http://{}", config.bind_addr());
    println!("✅ Server accessible at http://localhost:{}", config.port);
    println!("{}", "=".repeat(60));
    println!("🎬 Catalog:");
    println!("   Films: {}", report.loaded);
    println!("   Lines read: {}", report.lines);
    println!("   Malformed lines: {}", report.malformed);
    println!("   Image failures: {}", report.image_failures);
    println!(
        "   Strict image paths: {}",
        if config.strict_image_paths { "on" } else { "off" }
    );
    println!("{}", "=".repeat(60));
}
