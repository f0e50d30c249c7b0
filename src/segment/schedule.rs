// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Action ordering schedule for stack segments
//!
//! A stack segment expands into a fixed template of up to five steps.
//! Only the steps that are present receive a run order; run orders start
//! at 1 and leave no gaps, so every absent step shifts the later ones down.

use std::fmt;

/// One step of the stack segment template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Build,
    PublishAssets,
    PrepareChangeSet,
    ManualApproval,
    ExecuteChangeSet,
}

impl Step {
    /// Template order
    pub const TEMPLATE: [Step; 5] = [
        Step::Build,
        Step::PublishAssets,
        Step::PrepareChangeSet,
        Step::ManualApproval,
        Step::ExecuteChangeSet,
    ];

    /// Whether this step takes part under `flags`
    pub fn is_present(self, flags: ScheduleFlags) -> bool {
        match self {
            Self::Build | Self::PublishAssets => flags.build,
            Self::PrepareChangeSet | Self::ExecuteChangeSet => true,
            Self::ManualApproval => flags.approval,
        }
    }

    /// Name of the action emitted for this step
    pub fn action_name(self) -> &'static str {
        match self {
            Self::Build => "Build",
            Self::PublishAssets => "PublishAssets",
            Self::PrepareChangeSet => "PrepareChanges",
            Self::ManualApproval => "ApproveChanges",
            Self::ExecuteChangeSet => "ExecuteChanges",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_name())
    }
}

/// Which optional steps are present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleFlags {
    pub build: bool,
    pub approval: bool,
}

/// Present steps paired with their run orders, in template order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    slots: Vec<(Step, u32)>,
}

impl Schedule {
    pub fn new(flags: ScheduleFlags) -> Self {
        let slots = Step::TEMPLATE
            .into_iter()
            .filter(|step| step.is_present(flags))
            .zip(1u32..)
            .collect();
        Self { slots }
    }

    /// Run order of `step`, or `None` if it is absent
    pub fn run_order(&self, step: Step) -> Option<u32> {
        self.slots
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, order)| *order)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, u32)> + '_ {
        self.slots.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(build: bool, approval: bool) -> Vec<(Step, u32)> {
        Schedule::new(ScheduleFlags { build, approval }).iter().collect()
    }

    #[test]
    fn test_deploy_only() {
        assert_eq!(
            orders(false, false),
            vec![(Step::PrepareChangeSet, 1), (Step::ExecuteChangeSet, 2)]
        );
    }

    #[test]
    fn test_build_without_approval() {
        assert_eq!(
            orders(true, false),
            vec![
                (Step::Build, 1),
                (Step::PublishAssets, 2),
                (Step::PrepareChangeSet, 3),
                (Step::ExecuteChangeSet, 4),
            ]
        );
    }

    #[test]
    fn test_approval_without_build() {
        assert_eq!(
            orders(false, true),
            vec![
                (Step::PrepareChangeSet, 1),
                (Step::ManualApproval, 2),
                (Step::ExecuteChangeSet, 3),
            ]
        );
    }

    #[test]
    fn test_build_and_approval() {
        assert_eq!(
            orders(true, true),
            vec![
                (Step::Build, 1),
                (Step::PublishAssets, 2),
                (Step::PrepareChangeSet, 3),
                (Step::ManualApproval, 4),
                (Step::ExecuteChangeSet, 5),
            ]
        );
    }

    #[test]
    fn test_publish_assets_never_without_build() {
        let schedule = Schedule::new(ScheduleFlags {
            build: false,
            approval: true,
        });
        assert_eq!(schedule.run_order(Step::PublishAssets), None);
        assert_eq!(schedule.run_order(Step::Build), None);
        assert_eq!(schedule.len(), 3);
    }
}
