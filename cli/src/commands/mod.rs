pub mod check;
pub mod group;
pub mod init_config;
pub mod link;
pub mod show;
pub mod unlink;
pub mod zone;

use anyhow::{anyhow, Result};
use colored::Colorize;
use sequencer_core::{
    JsonFileRepository, SequenceDocument, SequenceEditor, SequenceRepository, SequencerConfig,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration plus the document repository every command works against
pub struct Workspace {
    config: SequencerConfig,
    repository: JsonFileRepository,
}

impl Workspace {
    pub fn new(config: SequencerConfig, store: Option<&Path>) -> Self {
        let base_path = store
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&config.storage.base_path));
        debug!("Document store: {}", base_path.display());

        Workspace {
            config,
            repository: JsonFileRepository::new(base_path),
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Load a saved document; a missing one is an error
    pub fn load_document(&self, bom: &str, spec: &str) -> Result<SequenceDocument> {
        self.repository.load(bom, spec)?.ok_or_else(|| {
            anyhow!(
                "No sequence document for {}/{} under {}",
                bom,
                spec,
                self.repository.base_path().display()
            )
        })
    }

    pub fn open_editor(&self, bom: &str, spec: &str) -> Result<SequenceEditor> {
        let document = self.load_document(bom, spec)?;
        let mut editor = SequenceEditor::from_document(document, &self.config.canvas);
        print_notices(&mut editor);
        Ok(editor)
    }

    pub fn save_editor(&self, editor: &SequenceEditor) -> Result<()> {
        self.repository.save(&editor.to_document())?;
        Ok(())
    }
}

/// Print and clear the editor's pending notices
pub fn print_notices(editor: &mut SequenceEditor) {
    for notice in editor.drain_notices() {
        eprintln!("{} {}", "notice:".yellow(), notice);
    }
}
