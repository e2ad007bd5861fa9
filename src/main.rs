use std::process::exit;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = s3_cleanup::main_rs().await;

    exit(exit_code);
}
