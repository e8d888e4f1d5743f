use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::config::{SpecialTokenIds, SpecialTokens};
use super::error::TokenizerError;

/// Immutable subword vocabulary: content pieces mapped to raw ids in `[0, N)`,
/// plus the ids of the four reserved tokens.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pieces: HashMap<String, u32>,
    size: usize,
    max_piece_chars: usize,
    special_ids: SpecialTokenIds,
}

impl Vocabulary {
    /// Builds a vocabulary where each piece's raw id is its position in `pieces`.
    ///
    /// Pieces equal to a reserved token string still consume an id but are not
    /// matchable as content.
    pub fn from_pieces<I, S>(
        pieces: I,
        special_tokens: &SpecialTokens,
        special_ids: SpecialTokenIds,
    ) -> Result<Self, TokenizerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = HashMap::new();
        let mut size = 0usize;

        for (raw_id, piece) in pieces.into_iter().enumerate() {
            let piece = piece.into();
            size = raw_id + 1;

            if special_tokens.contains(&piece) {
                continue;
            }
            if map.insert(piece.clone(), raw_id as u32).is_some() {
                return Err(TokenizerError::DuplicatePiece { piece });
            }
        }

        Self::assemble(map, size, special_ids)
    }

    /// Reads a line-oriented vocabulary: one piece per line, optionally followed
    /// by a tab and a score (SentencePiece `.vocab` export).
    pub fn from_vocab_file(
        path: &Path,
        special_tokens: &SpecialTokens,
        special_ids: SpecialTokenIds,
    ) -> Result<Self, TokenizerError> {
        let content = read_vocab_source(path)?;

        let mut lines: Vec<&str> = content.lines().collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }

        let mut pieces = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            let mut columns = line.split('\t');
            let piece = columns.next().unwrap_or_default();

            if piece.is_empty() {
                return Err(TokenizerError::VocabParse {
                    line: idx + 1,
                    reason: "empty piece".to_string(),
                });
            }

            if let Some(score) = columns.next()
                && score.trim().parse::<f32>().is_err()
            {
                return Err(TokenizerError::VocabParse {
                    line: idx + 1,
                    reason: format!("invalid score '{}'", score),
                });
            }

            pieces.push(piece);
        }

        let vocab = Self::from_pieces(pieces, special_tokens, special_ids)?;

        debug!(
            path = %path.display(),
            size = vocab.len(),
            max_piece_chars = vocab.max_piece_chars(),
            "Loaded line-oriented vocabulary"
        );

        Ok(vocab)
    }

    /// Reads the vocabulary out of a HuggingFace `tokenizer.json`.
    ///
    /// Raw ids are taken verbatim. Reserved ids are resolved from the special
    /// token strings when the file defines them; otherwise `special_ids` is kept.
    pub fn from_tokenizer_json(
        path: &Path,
        special_tokens: &SpecialTokens,
        special_ids: SpecialTokenIds,
    ) -> Result<Self, TokenizerError> {
        if !path.exists() {
            return Err(TokenizerError::VocabNotFound {
                path: path.to_path_buf(),
            });
        }

        let tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            TokenizerError::VocabReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let mut map = tokenizer.get_vocab(true);
        let resolve = |token: &str, fallback: u32| map.get(token).copied().unwrap_or(fallback);
        let special_ids = SpecialTokenIds {
            pad: resolve(&special_tokens.pad, special_ids.pad),
            unk: resolve(&special_tokens.unk, special_ids.unk),
            bos: resolve(&special_tokens.bos, special_ids.bos),
            eos: resolve(&special_tokens.eos, special_ids.eos),
        };

        map.retain(|piece, _| !special_tokens.contains(piece));
        let size = tokenizer.get_vocab_size(true);

        let vocab = Self::assemble(map, size, special_ids)?;

        debug!(
            path = %path.display(),
            size = vocab.len(),
            "Loaded vocabulary from tokenizer.json"
        );

        Ok(vocab)
    }

    fn assemble(
        pieces: HashMap<String, u32>,
        size: usize,
        special_ids: SpecialTokenIds,
    ) -> Result<Self, TokenizerError> {
        if pieces.is_empty() {
            return Err(TokenizerError::VocabParse {
                line: 0,
                reason: "vocabulary contains no content pieces".to_string(),
            });
        }

        let max_piece_chars = pieces
            .keys()
            .map(|piece| piece.chars().count())
            .max()
            .unwrap_or(1);

        Ok(Self {
            pieces,
            size,
            max_piece_chars,
            special_ids,
        })
    }

    /// Returns the raw (unshifted) id of a content piece.
    #[inline]
    pub fn get(&self, piece: &str) -> Option<u32> {
        self.pieces.get(piece).copied()
    }

    /// Returns `true` if `piece` is a matchable content piece.
    pub fn contains(&self, piece: &str) -> bool {
        self.pieces.contains_key(piece)
    }

    /// Number of raw ids (`N`), reserved entries included.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Longest content piece, in chars.
    pub fn max_piece_chars(&self) -> usize {
        self.max_piece_chars
    }

    pub fn special_ids(&self) -> SpecialTokenIds {
        self.special_ids
    }

    /// Iterates over content pieces and their raw ids (arbitrary order).
    pub fn pieces(&self) -> impl Iterator<Item = (&str, u32)> {
        self.pieces.iter().map(|(piece, id)| (piece.as_str(), *id))
    }
}

fn read_vocab_source(path: &Path) -> Result<String, TokenizerError> {
    if !path.exists() {
        return Err(TokenizerError::VocabNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|e| TokenizerError::VocabReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
