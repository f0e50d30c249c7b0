// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Segment groups: the segments sharing one stage position

use crate::artifact::SegmentId;

/// Segments occupying one stage, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentGroup {
    /// Explicit stage name; derived from the segments when absent
    pub name: Option<String>,
    pub segments: Vec<SegmentId>,
}

impl SegmentGroup {
    pub fn new(segments: Vec<SegmentId>) -> Self {
        Self {
            name: None,
            segments,
        }
    }

    pub fn named(name: impl Into<String>, segments: Vec<SegmentId>) -> Self {
        Self {
            name: Some(name.into()),
            segments,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<SegmentId> for SegmentGroup {
    fn from(segment: SegmentId) -> Self {
        Self::new(vec![segment])
    }
}

impl From<Vec<SegmentId>> for SegmentGroup {
    fn from(segments: Vec<SegmentId>) -> Self {
        Self::new(segments)
    }
}
