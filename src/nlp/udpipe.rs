//! UDPipe segmentation backend.
//!
//! Shells out to the `udpipe` binary with a Russian model, piping the
//! message text to stdin and parsing CoNLL-U from stdout.

use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::{Sentence, Word};

use super::Segmenter;

/// Segmenter backed by the UDPipe command-line tool
pub struct UdpipeSegmenter {
    /// Binary to invoke (default: "udpipe")
    binary: String,

    /// Path to the trained model file
    model: String,
}

impl UdpipeSegmenter {
    /// Create a segmenter using `udpipe` from PATH
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_binary("udpipe", model)
    }

    /// Create a segmenter with a custom binary path
    pub fn with_binary(binary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
        }
    }

    async fn run_engine(&self, text: &str) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["--tokenize", "--tag", "--parse"])
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", self.binary))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .context("failed to write text to udpipe stdin")?;
            // Drop stdin to signal EOF
        }

        let output = child
            .wait_with_output()
            .await
            .context("failed to wait for udpipe")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "udpipe exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        String::from_utf8(output.stdout).context("udpipe output is not valid UTF-8")
    }
}

#[async_trait]
impl Segmenter for UdpipeSegmenter {
    async fn segment(&self, text: &str) -> Result<Vec<Sentence>> {
        let conllu = self.run_engine(text).await?;
        parse_conllu(&conllu)
    }

    async fn health_check(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("failed to run '{} --version'", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("udpipe health check failed: {}", stderr.trim());
        }

        tokio::fs::metadata(&self.model)
            .await
            .with_context(|| format!("udpipe model not found: {}", self.model))?;

        Ok(())
    }
}

/// Parse CoNLL-U output into sentences.
///
/// Multiword-token ranges (`1-2`) and enhanced empty nodes (`1.1`) are
/// skipped, so the remaining token ids are consecutive and map directly
/// onto 0-based word indices.
pub fn parse_conllu(conllu: &str) -> Result<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut text: Option<String> = None;
    let mut words: Vec<Word> = Vec::new();

    for line in conllu.lines().chain(std::iter::once("")) {
        let line = line.trim_end();

        if line.is_empty() {
            if !words.is_empty() {
                sentences.push(finish_sentence(text.take(), std::mem::take(&mut words))?);
            }
            text = None;
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if let Some(value) = comment.trim().strip_prefix("text =") {
                text = Some(value.trim().to_string());
            }
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 8 {
            anyhow::bail!("malformed CoNLL-U line: {}", line);
        }

        // Skip multiword ranges and empty nodes
        if fields[0].contains('-') || fields[0].contains('.') {
            continue;
        }

        let index = words.len();
        let head: usize = fields[6]
            .parse()
            .with_context(|| format!("bad HEAD field in line: {}", line))?;

        words.push(Word {
            text: fields[1].to_string(),
            upos: fields[3].to_string(),
            // CoNLL-U heads are 1-based with 0 for root; the root word
            // points at itself in our model
            head: if head == 0 { index } else { head - 1 },
            deprel: fields[7].to_string(),
        });
    }

    Ok(sentences)
}

fn finish_sentence(text: Option<String>, words: Vec<Word>) -> Result<Sentence> {
    for (i, word) in words.iter().enumerate() {
        if word.head >= words.len() {
            anyhow::bail!(
                "word {} ('{}') has head {} outside sentence of {} words",
                i,
                word.text,
                word.head,
                words.len()
            );
        }
    }

    let text = text.unwrap_or_else(|| {
        words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    });

    Ok(Sentence::new(text, words))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# newdoc
# sent_id = 1
# text = Мама мыла раму.
1\tМама\tмама\tNOUN\t_\t_\t2\tnsubj\t_\t_
2\tмыла\tмыть\tVERB\t_\t_\t0\troot\t_\t_
3\tраму\tрама\tNOUN\t_\t_\t2\tobj\t_\t_
4\t.\t.\tPUNCT\t_\t_\t2\tpunct\t_\t_

# sent_id = 2
# text = Привет!
1\tПривет\tпривет\tINTJ\t_\t_\t0\troot\t_\t_
2\t!\t!\tPUNCT\t_\t_\t1\tpunct\t_\t_
";

    #[test]
    fn test_parses_sentences_in_order() {
        let sentences = parse_conllu(SAMPLE).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Мама мыла раму.");
        assert_eq!(sentences[1].text, "Привет!");
    }

    #[test]
    fn test_head_indices_are_zero_based() {
        let sentences = parse_conllu(SAMPLE).unwrap();
        let first = &sentences[0];
        assert_eq!(first.words[0].head, 1); // Мама -> мыла
        assert_eq!(first.words[1].head, 1); // root points at itself
        assert!(first.is_root(1));
        assert_eq!(first.words[2].deprel, "obj");
    }

    #[test]
    fn test_skips_multiword_ranges_and_empty_nodes() {
        let conllu = "\
# text = во что
1-2\tво_что\t_\t_\t_\t_\t_\t_\t_\t_
1\tво\tв\tADP\t_\t_\t2\tcase\t_\t_
2\tчто\tчто\tPRON\t_\t_\t0\troot\t_\t_
2.1\t_\t_\t_\t_\t_\t_\t_\t_\t_
";
        let sentences = parse_conllu(conllu).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].words.len(), 2);
        assert_eq!(sentences[0].words[0].head, 1);
    }

    #[test]
    fn test_text_falls_back_to_joined_forms() {
        let conllu = "1\tПривет\tпривет\tINTJ\t_\t_\t0\troot\t_\t_\n";
        let sentences = parse_conllu(conllu).unwrap();
        assert_eq!(sentences[0].text, "Привет");
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(parse_conllu("1\tоборванная\tстрока").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_head() {
        let conllu = "1\tслово\tслово\tNOUN\t_\t_\t9\tnsubj\t_\t_\n";
        assert!(parse_conllu(conllu).is_err());
    }

    #[test]
    fn test_empty_input_yields_no_sentences() {
        assert!(parse_conllu("").unwrap().is_empty());
    }
}
