//! Level maps: parsing and loading
//!
//! A level is plain text, one character per 64x64 grid cell:
//!
//! | letter | entity |
//! |--------|--------|
//! | `x`    | wall   |
//! | `v`    | vortex |
//! | `s`    | star   |
//! | `f`    | finish |
//! | `p`    | portal |
//! | ` `    | empty  |
//!
//! The last text line is grid row 0, so the map reads top-down the same way
//! it appears on screen. Any other character rejects the whole level.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;

use super::registry::{EntityKind, EntityRegistry};
use crate::cell_center;

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    /// A character outside the recognized set
    Malformed {
        /// 1-based text line, counted from the top of the file
        line: usize,
        /// 1-based character column
        column: usize,
        letter: char,
    },
    /// No level file for the requested index
    MissingResource { name: String },
    /// Level index outside `1..=total`
    InvalidIndex { index: u32, total: u32 },
    IoError(std::io::Error),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Malformed {
                line,
                column,
                letter,
            } => write!(
                f,
                "unknown level letter {:?} at line {}, column {}",
                letter, line, column
            ),
            LevelError::MissingResource { name } => write!(f, "could not find level {}", name),
            LevelError::InvalidIndex { index, total } => {
                write!(f, "level index {} outside 1..={}", index, total)
            }
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// One non-blank map cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: EntityKind,
    pub column: usize,
    /// Grid row, 0 at the bottom
    pub row: usize,
    /// Cell center in world units
    pub position: Vec2,
}

impl Placement {
    pub fn letter(&self) -> char {
        self.kind.letter()
    }
}

/// Parse a level map into placements, bottom row first.
///
/// Nothing is returned unless the whole text is valid.
pub fn parse(text: &str) -> Result<Vec<Placement>, LevelError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let total_lines = lines.len();
    let mut placements = Vec::new();

    for (row, line) in lines.iter().rev().enumerate() {
        for (column, letter) in line.chars().enumerate() {
            if letter == ' ' {
                continue;
            }
            let Some(kind) = EntityKind::from_letter(letter) else {
                return Err(LevelError::Malformed {
                    line: total_lines - row,
                    column: column + 1,
                    letter,
                });
            };
            placements.push(Placement {
                kind,
                column,
                row,
                position: cell_center(column, row),
            });
        }
    }

    Ok(placements)
}

/// Parse a level and populate a registry with it.
///
/// The registry is only touched once parsing has succeeded.
pub fn build(text: &str, registry: &mut EntityRegistry) -> Result<usize, LevelError> {
    let placements = parse(text)?;
    for placement in &placements {
        registry.add_entity(placement.kind, placement.position);
    }
    Ok(placements.len())
}

/// Where level texts come from
pub trait LevelSource {
    /// Text of the 1-based level `index`
    fn level_text(&self, index: u32) -> Result<String, LevelError>;
}

/// Resource name for a level index
pub fn level_name(index: u32) -> String {
    format!("level{}.txt", index)
}

/// Levels compiled into the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLevels;

impl BundledLevels {
    const LEVELS: [&'static str; 2] = [
        include_str!("../../levels/level1.txt"),
        include_str!("../../levels/level2.txt"),
    ];

    pub fn count() -> u32 {
        Self::LEVELS.len() as u32
    }
}

impl LevelSource for BundledLevels {
    fn level_text(&self, index: u32) -> Result<String, LevelError> {
        index
            .checked_sub(1)
            .and_then(|i| Self::LEVELS.get(i as usize))
            .map(|text| text.to_string())
            .ok_or_else(|| LevelError::MissingResource {
                name: level_name(index),
            })
    }
}

/// Levels read from `level{N}.txt` files in a directory
#[derive(Debug, Clone)]
pub struct DirectoryLevels {
    dir: PathBuf,
}

impl DirectoryLevels {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl LevelSource for DirectoryLevels {
    fn level_text(&self, index: u32) -> Result<String, LevelError> {
        let name = level_name(index);
        let path = self.dir.join(&name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LevelError::MissingResource {
                    name: path.display().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
