//! Partition attendees into fixed-size groups of similar respondents.
//!
//! # Algorithm
//!
//! ```text
//! enriched attendees        sorted by similarity key      chunks of k
//! ┌──────────────────┐      ┌──────────────────┐          ┌───────────┐
//! │ C (key 14.0)     │      │ A (key  2.0)     │          │ Group 1   │
//! │ A (key  2.0)     │  →   │ B (key  2.0)     │    →     │ A, B      │
//! │ B (key  2.0)     │      │ C (key 14.0)     │          ├───────────┤
//! └──────────────────┘      └──────────────────┘          │ Group 2   │
//!                                                         │ C         │
//!                                                         └───────────┘
//! ```
//!
//! The key is a one-dimensional projection of four preference dimensions,
//! so adjacent attendees are only approximately similar. The sort is
//! stable: equal keys keep their input order, which makes the grouping
//! reproducible for identical input.

use crate::error::GroupingError;
use crate::models::Attendee;

/// Group size used by the command-line tool.
pub const DEFAULT_GROUP_SIZE: usize = 8;

/// A numbered, borrowed slice of consecutive attendees.
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    /// 1-based position in the grouping.
    pub number: usize,
    pub members: &'a [Attendee],
}

impl Group<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Attendees in similarity order, partitioned into groups on demand.
#[derive(Debug, Clone)]
pub struct Grouping {
    attendees: Vec<Attendee>,
    group_size: usize,
}

impl Grouping {
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// All attendees, in output order.
    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    /// Number of groups, `ceil(n / k)`.
    pub fn len(&self) -> usize {
        self.attendees.len().div_ceil(self.group_size)
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    /// Groups in order; only the last may be shorter than the group size.
    pub fn groups(&self) -> impl Iterator<Item = Group<'_>> {
        self.attendees
            .chunks(self.group_size)
            .enumerate()
            .map(|(i, members)| Group { number: i + 1, members })
    }

    pub fn into_attendees(self) -> Vec<Attendee> {
        self.attendees
    }
}

/// Sort attendees by [`Attendee::similarity_key`] and chunk them into groups of `group_size`.
pub fn assign_groups(mut attendees: Vec<Attendee>, group_size: usize) -> Result<Grouping, GroupingError> {
    if group_size == 0 {
        return Err(GroupingError::ZeroGroupSize);
    }

    // sort_by is stable; total_cmp gives NaN a fixed place
    attendees.sort_by(|a, b| a.similarity_key().total_cmp(&b.similarity_key()));

    Ok(Grouping { attendees, group_size })
}
