// tfdocs-setup-core/src/test_support.rs
#![cfg(test)]

//! Recording doubles shared by the installer and wrapper tests.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineCall {
    Debug(String),
    Info(String),
    Error(String),
    AddPath(PathBuf),
    ExportVariable(String, String),
    SetOutput(String, String),
    AddMatcher(PathBuf),
    SetFailed(String),
}

/// A [`Pipeline`] that only records what it was asked to do.
#[derive(Default)]
pub struct RecordingPipeline {
    pub calls: Mutex<Vec<PipelineCall>>,
    pub fail_outputs: bool,
}

impl RecordingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PipelineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&PipelineCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn output(&self, name: &str) -> Option<String> {
        self.calls().into_iter().find_map(|c| match c {
            PipelineCall::SetOutput(n, v) if n == name => Some(v),
            _ => None,
        })
    }

    pub fn failed(&self) -> bool {
        self.count(|c| matches!(c, PipelineCall::SetFailed(_))) > 0
    }

    fn record(&self, call: PipelineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Pipeline for RecordingPipeline {
    fn debug(&self, message: &str) {
        self.record(PipelineCall::Debug(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.record(PipelineCall::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.record(PipelineCall::Error(message.to_string()));
    }

    fn add_path(&self, dir: &Path) -> Result<()> {
        self.record(PipelineCall::AddPath(dir.to_path_buf()));
        Ok(())
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        self.record(PipelineCall::ExportVariable(name.to_string(), value.to_string()));
        Ok(())
    }

    fn set_output(&self, name: &str, value: &str) -> Result<()> {
        if self.fail_outputs {
            return Err(anyhow!("output file is read-only"));
        }
        self.record(PipelineCall::SetOutput(name.to_string(), value.to_string()));
        Ok(())
    }

    fn add_matcher(&self, matcher_file: &Path) {
        self.record(PipelineCall::AddMatcher(matcher_file.to_path_buf()));
    }

    fn set_failed(&self, message: &str) {
        self.record(PipelineCall::SetFailed(message.to_string()));
    }
}
