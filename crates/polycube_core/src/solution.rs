//! Puzzle variants and their solved layouts.
//!
//! A solution assigns every lattice cell of the `dim`³ cube to exactly one
//! piece. Solutions ship as JSON next to this crate:
//!
//! ```text
//! { "solutions": [ [ { "piece": 0, "cells": [[0,0,0], [1,0,0], ...] }, ... ] ] }
//! ```
//!
//! Every solution is validated on load: cells unique and inside the cube,
//! exact cover, and each piece's cells congruent to its catalog shape.

use bevy::math::{IVec3, Vec3};
use serde::Deserialize;
use std::collections::HashSet;

use crate::geometry::{identify_rotation, lattice_to_world};
use crate::pieces::{PieceShape, BEDLAM_PIECES, BLOCKER_PIECES};

const BLOCKER_JSON: &str = include_str!("../data/blocker.json");
const BEDLAM_JSON: &str = include_str!("../data/bedlam.json");

/// Errors that can occur while loading or validating a solution.
#[derive(Debug)]
pub enum SolutionError {
    /// JSON parse error
    Json(serde_json::Error),
    /// The file contains no solutions
    Empty,
    /// Piece index outside the catalog
    UnknownPiece(usize),
    /// A piece appears twice in one solution
    DuplicatePiece(usize),
    /// A cell lies outside the cube
    OutOfBounds { piece: usize, cell: [i32; 3] },
    /// Two entries claim the same cell
    Overlap { cell: [i32; 3] },
    /// Cells left uncovered
    Incomplete { covered: usize, expected: usize },
    /// A piece's cells are not a rotation of its catalog shape
    ShapeMismatch(usize),
}

impl std::fmt::Display for SolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionError::Json(e) => write!(f, "JSON error: {}", e),
            SolutionError::Empty => write!(f, "No solutions in data"),
            SolutionError::UnknownPiece(i) => write!(f, "Unknown piece index {}", i),
            SolutionError::DuplicatePiece(i) => write!(f, "Piece {} listed twice", i),
            SolutionError::OutOfBounds { piece, cell } => {
                write!(f, "Piece {} has cell {:?} outside the cube", piece, cell)
            }
            SolutionError::Overlap { cell } => write!(f, "Cell {:?} is claimed twice", cell),
            SolutionError::Incomplete { covered, expected } => {
                write!(f, "Only {} of {} cells covered", covered, expected)
            }
            SolutionError::ShapeMismatch(i) => {
                write!(f, "Piece {} cells do not match its shape", i)
            }
        }
    }
}

impl std::error::Error for SolutionError {}

impl From<serde_json::Error> for SolutionError {
    fn from(e: serde_json::Error) -> Self {
        SolutionError::Json(e)
    }
}

/// Result type for solution loading.
pub type SolutionResult<T> = Result<T, SolutionError>;

/// Which puzzle is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PuzzleKind {
    /// 3x3x3, seven pieces
    #[default]
    Blocker,
    /// 4x4x4, thirteen pieces
    Bedlam,
}

impl PuzzleKind {
    /// Edge length of the solved cube in cells.
    pub fn dim(self) -> u32 {
        match self {
            PuzzleKind::Blocker => 3,
            PuzzleKind::Bedlam => 4,
        }
    }

    pub fn catalog(self) -> &'static [PieceShape] {
        match self {
            PuzzleKind::Blocker => BLOCKER_PIECES,
            PuzzleKind::Bedlam => BEDLAM_PIECES,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PuzzleKind::Blocker => "blocker",
            PuzzleKind::Bedlam => "bedlam",
        }
    }

    /// Parse a variant name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blocker" | "soma" => Some(PuzzleKind::Blocker),
            "bedlam" => Some(PuzzleKind::Bedlam),
            _ => None,
        }
    }

    fn bundled_json(self) -> &'static str {
        match self {
            PuzzleKind::Blocker => BLOCKER_JSON,
            PuzzleKind::Bedlam => BEDLAM_JSON,
        }
    }
}

#[derive(Deserialize)]
struct SolutionFile {
    solutions: Vec<Vec<RawEntry>>,
}

#[derive(Deserialize)]
struct RawEntry {
    piece: usize,
    cells: Vec<[i32; 3]>,
}

/// One piece's solved placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionEntry {
    pub piece: usize,
    pub cells: Vec<IVec3>,
}

/// A validated assignment of cube cells to pieces.
#[derive(Debug, Clone)]
pub struct Solution {
    pub kind: PuzzleKind,
    /// Entries in data order; drawing and assembly follow this order
    pub entries: Vec<SolutionEntry>,
}

impl Solution {
    /// All bundled solutions for a puzzle.
    pub fn bundled(kind: PuzzleKind) -> SolutionResult<Vec<Solution>> {
        Self::all_from_json(kind, kind.bundled_json())
    }

    /// The first bundled solution for a puzzle.
    pub fn first(kind: PuzzleKind) -> SolutionResult<Solution> {
        Self::bundled(kind)?
            .into_iter()
            .next()
            .ok_or(SolutionError::Empty)
    }

    /// The first solution in an externally supplied JSON document.
    pub fn from_json(kind: PuzzleKind, text: &str) -> SolutionResult<Solution> {
        Self::all_from_json(kind, text)?
            .into_iter()
            .next()
            .ok_or(SolutionError::Empty)
    }

    /// Parse every solution in a JSON document.
    pub fn all_from_json(kind: PuzzleKind, text: &str) -> SolutionResult<Vec<Solution>> {
        let file: SolutionFile = serde_json::from_str(text)?;
        if file.solutions.is_empty() {
            return Err(SolutionError::Empty);
        }
        file.solutions
            .into_iter()
            .map(|raw| {
                let entries = raw
                    .into_iter()
                    .map(|e| SolutionEntry {
                        piece: e.piece,
                        cells: e.cells.into_iter().map(IVec3::from_array).collect(),
                    })
                    .collect();
                Solution::new(kind, entries)
            })
            .collect()
    }

    /// Validate entries and build a solution.
    pub fn new(kind: PuzzleKind, entries: Vec<SolutionEntry>) -> SolutionResult<Self> {
        let solution = Self { kind, entries };
        solution.validate()?;
        Ok(solution)
    }

    fn validate(&self) -> SolutionResult<()> {
        let dim = self.kind.dim() as i32;
        let catalog = self.kind.catalog();
        let mut seen_pieces = HashSet::new();
        let mut covered = HashSet::new();

        for entry in &self.entries {
            let shape = catalog
                .get(entry.piece)
                .ok_or(SolutionError::UnknownPiece(entry.piece))?;
            if !seen_pieces.insert(entry.piece) {
                return Err(SolutionError::DuplicatePiece(entry.piece));
            }
            for &cell in &entry.cells {
                if cell.min_element() < 0 || cell.max_element() >= dim {
                    return Err(SolutionError::OutOfBounds {
                        piece: entry.piece,
                        cell: cell.to_array(),
                    });
                }
                if !covered.insert(cell) {
                    return Err(SolutionError::Overlap {
                        cell: cell.to_array(),
                    });
                }
            }
            if identify_rotation(&shape.lattice(), &entry.cells).is_none() {
                return Err(SolutionError::ShapeMismatch(entry.piece));
            }
        }

        let expected = (dim * dim * dim) as usize;
        if covered.len() != expected {
            return Err(SolutionError::Incomplete {
                covered: covered.len(),
                expected,
            });
        }
        Ok(())
    }

    pub fn dim(&self) -> u32 {
        self.kind.dim()
    }

    pub fn piece_count(&self) -> usize {
        self.entries.len()
    }

    /// Solved world-space cube centers of each entry, in entry order.
    pub fn world_cells(&self, cube_size: f32) -> Vec<Vec<Vec3>> {
        let dim = self.dim();
        self.entries
            .iter()
            .map(|e| {
                e.cells
                    .iter()
                    .map(|&c| lattice_to_world(c, dim, cube_size))
                    .collect()
            })
            .collect()
    }
}
