use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{FailurePolicy, Settings};
use crate::error::Result;
use crate::io::{csv_write, excel_read};
use crate::mapping;
use crate::model::{CanonicalRow, RemoteFile};
use crate::transfer::TransferClient;

/// Counters describing one completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Entries returned by the input folder listing.
    pub listed: usize,
    /// Files whose name matched the input pattern.
    pub qualified: usize,
    /// Files mapped and archived.
    pub processed: usize,
    /// Files left in place after a failure under [`FailurePolicy::Skip`].
    pub skipped: usize,
    /// Canonical rows in the published output.
    pub rows: usize,
    /// Whether a new output file was written.
    pub published: bool,
}

/// Drives one harvest: list, remap, archive and publish.
pub struct Pipeline<C> {
    client: C,
    settings: Settings,
}

impl<C: TransferClient> Pipeline<C> {
    pub fn new(client: C, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// Runs the job end to end.
    ///
    /// Once the session is open it is closed exactly once, whichever way the
    /// run ends. An error from the run itself wins over a disconnect error.
    #[instrument(
        level = "info",
        skip_all,
        fields(host = %self.settings.endpoint.host, input = %self.settings.input_folder)
    )]
    pub fn run(&mut self) -> Result<RunSummary> {
        let pattern = compile_pattern(&self.settings.input_pattern)?;

        self.client.connect(&self.settings.endpoint)?;

        let outcome = self.harvest(&pattern);
        let closed = self.client.disconnect();

        match (outcome, closed) {
            (Ok(summary), Ok(())) => {
                info!(
                    processed = summary.processed,
                    rows = summary.rows,
                    published = summary.published,
                    "run complete"
                );
                Ok(summary)
            }
            (Ok(_), Err(err)) => Err(err),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "disconnect failed after run error");
                }
                Err(err)
            }
        }
    }

    fn harvest(&mut self, pattern: &Regex) -> Result<RunSummary> {
        let listing = self.client.list(&self.settings.input_folder)?;
        let candidates = select_inputs(&listing, pattern);
        info!(
            listed = listing.len(),
            qualified = candidates.len(),
            "input folder scanned"
        );

        let mut summary = RunSummary {
            listed: listing.len(),
            qualified: candidates.len(),
            ..RunSummary::default()
        };
        let mut aggregate: Vec<CanonicalRow> = Vec::new();

        for file in candidates {
            match self.process_file(file) {
                Ok(rows) => {
                    self.client.move_file(
                        &self.settings.input_path(&file.name),
                        &self.settings.archived_input_path(&file.name),
                    )?;
                    info!(file = %file.name, rows = rows.len(), "input archived");
                    aggregate.extend(rows);
                    summary.processed += 1;
                }
                Err(err) => match self.settings.on_file_error {
                    FailurePolicy::Abort => {
                        warn!(file = %file.name, "input failed, aborting run");
                        return Err(err);
                    }
                    FailurePolicy::Skip => {
                        warn!(file = %file.name, error = %err, "input failed, leaving it in place");
                        summary.skipped += 1;
                    }
                },
            }
        }

        if summary.qualified > 0 {
            self.publish(&aggregate)?;
            summary.rows = aggregate.len();
            summary.published = true;
        } else {
            info!("no input matched, output left untouched");
        }

        Ok(summary)
    }

    /// Downloads, extracts and remaps one input file. The file is not
    /// archived here; that only happens once the whole file mapped cleanly.
    #[instrument(level = "info", skip_all, fields(file = %file.name))]
    pub fn process_file(&mut self, file: &RemoteFile) -> Result<Vec<CanonicalRow>> {
        let bytes = self.client.download(&self.settings.input_path(&file.name))?;
        let table = excel_read::read_first_sheet(&bytes, true)?;
        mapping::map_table(&table)
    }

    #[instrument(level = "info", skip_all, fields(rows = rows.len()))]
    fn publish(&mut self, rows: &[CanonicalRow]) -> Result<()> {
        let output = csv_write::write_bookings(rows)?;
        let target = self.settings.output_path();
        let archive = self.settings.archived_output_path();

        if let Err(err) = self.client.rename(&target, &archive, true) {
            warn!(from = %target, to = %archive, error = %err, "unable to rename existing output");
        }

        self.client.upload(&target, &output)?;
        info!(path = %target, size = output.len(), "output published");
        Ok(())
    }
}

/// Builds the case-insensitive input filter.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// Keeps the regular files whose name matches, in listing order.
pub fn select_inputs<'a>(listing: &'a [RemoteFile], pattern: &Regex) -> Vec<&'a RemoteFile> {
    listing
        .iter()
        .filter(|file| !file.is_dir && pattern.is_match(&file.name))
        .collect()
}
