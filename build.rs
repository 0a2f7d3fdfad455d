use shadow_rs::ShadowBuilder;

fn main() {
    println!("cargo:rerun-if-changed=migrations");
    // Version and git metadata for `--version`
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
