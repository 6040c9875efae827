use chrono::Utc;

fn main() {
    // 构建时间，供健康检查接口返回
    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("cargo:rerun-if-changed=build.rs");
}
