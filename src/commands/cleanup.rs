use owo_colors::OwoColorize;

use crate::cleanup::{AbortReason, Outcome, run_cleanup};
use crate::cli::{CleanupOptions, Process};
use crate::helpers::print_table;
use crate::prompt::TerminalPrompter;
use crate::s3::S3Store;

impl Process for CleanupOptions {
    async fn process(self) -> anyhow::Result<i32> {
        let store = S3Store::from_env().await;
        let mut prompter = TerminalPrompter::default();

        match run_cleanup(&store, &mut prompter).await? {
            Outcome::Deleted {
                bucket,
                region,
                report,
            } => {
                print_table(&report.rows());
                println!(
                    "Successfully deleted bucket: {} ({region})",
                    bucket.green().bold()
                );
            }
            Outcome::Aborted(AbortReason::NoBuckets) => {
                println!("No buckets found.");
            }
            Outcome::Aborted(AbortReason::NothingSelected) => {
                println!("No bucket selected.");
            }
            Outcome::Aborted(AbortReason::Declined) => {
                println!("Bucket deletion cancelled.");
            }
        }

        Ok(0)
    }
}
