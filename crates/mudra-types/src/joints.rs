// ─────────────────────────────────────────────────────────────────────
// Mudra — Joint Topology
// ─────────────────────────────────────────────────────────────────────
//! Skeletal joint enumeration and the fixed parent tree rooted at the
//! spine base. The parent function is a pure lookup table; the
//! declaration order of [`JointType`] is the canonical iteration order
//! for deterministic pairwise walks.

use serde::{Deserialize, Serialize};

/// Skeletal landmark identifiers, declared in sensor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JointType {
    SpineBase,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

/// Body side selector for sided joint names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointSide {
    Left,
    Right,
}

/// Joint names that exist on both body sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SidedJointName {
    Ankle,
    Elbow,
    Foot,
    Hand,
    HandTip,
    Hip,
    Knee,
    Shoulder,
    Thumb,
    Wrist,
}

/// Absolute motion direction in body space: X right, Y up, Z front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Front,
    Back,
}

/// Placement of one joint relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeDirection {
    InFrontOfYour,
    BehindYour,
    ToTheRightOfYour,
    ToTheLeftOfYour,
    OnTopOfYour,
    BelowYour,
}

impl JointType {
    /// Every joint, in declaration order.
    pub const ALL: [JointType; 25] = [
        JointType::SpineBase,
        JointType::SpineMid,
        JointType::Neck,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
        JointType::SpineShoulder,
        JointType::HandTipLeft,
        JointType::ThumbLeft,
        JointType::HandTipRight,
        JointType::ThumbRight,
    ];

    /// Root of the parent tree and origin of the body coordinate system.
    pub const ROOT: JointType = JointType::SpineBase;

    /// Parent joint in the skeletal tree. The root is its own parent.
    pub fn parent(self) -> JointType {
        use JointType::*;
        match self {
            SpineBase => SpineBase,
            SpineMid => SpineBase,
            SpineShoulder => SpineMid,
            Neck => SpineShoulder,
            Head => Neck,
            ShoulderLeft => SpineShoulder,
            ElbowLeft => ShoulderLeft,
            WristLeft => ElbowLeft,
            HandLeft => WristLeft,
            HandTipLeft => HandLeft,
            ThumbLeft => WristLeft,
            ShoulderRight => SpineShoulder,
            ElbowRight => ShoulderRight,
            WristRight => ElbowRight,
            HandRight => WristRight,
            HandTipRight => HandRight,
            ThumbRight => WristRight,
            HipLeft => SpineBase,
            KneeLeft => HipLeft,
            AnkleLeft => KneeLeft,
            FootLeft => AnkleLeft,
            HipRight => SpineBase,
            KneeRight => HipRight,
            AnkleRight => KneeRight,
            FootRight => AnkleRight,
        }
    }

    /// Chain from `self` up to (excluding) the root, leaf first.
    pub fn chain_to_root(self) -> Vec<JointType> {
        let mut result = Vec::new();
        let mut joint = self;
        while joint != JointType::ROOT {
            result.push(joint);
            joint = joint.parent();
        }
        result
    }

    /// Resolve a sided joint name to the concrete joint.
    pub fn sided(name: SidedJointName, side: JointSide) -> JointType {
        use JointType::*;
        let left = side == JointSide::Left;
        match name {
            SidedJointName::Ankle => {
                if left {
                    AnkleLeft
                } else {
                    AnkleRight
                }
            }
            SidedJointName::Elbow => {
                if left {
                    ElbowLeft
                } else {
                    ElbowRight
                }
            }
            SidedJointName::Foot => {
                if left {
                    FootLeft
                } else {
                    FootRight
                }
            }
            SidedJointName::Hand => {
                if left {
                    HandLeft
                } else {
                    HandRight
                }
            }
            SidedJointName::HandTip => {
                if left {
                    HandTipLeft
                } else {
                    HandTipRight
                }
            }
            SidedJointName::Hip => {
                if left {
                    HipLeft
                } else {
                    HipRight
                }
            }
            SidedJointName::Knee => {
                if left {
                    KneeLeft
                } else {
                    KneeRight
                }
            }
            SidedJointName::Shoulder => {
                if left {
                    ShoulderLeft
                } else {
                    ShoulderRight
                }
            }
            SidedJointName::Thumb => {
                if left {
                    ThumbLeft
                } else {
                    ThumbRight
                }
            }
            SidedJointName::Wrist => {
                if left {
                    WristLeft
                } else {
                    WristRight
                }
            }
        }
    }

    /// Human-readable joint name for instruction strings.
    pub fn display_name(self) -> &'static str {
        use JointType::*;
        match self {
            SpineBase => "spine base",
            SpineMid => "spine mid",
            SpineShoulder => "spine shoulder",
            Neck => "neck",
            Head => "head",
            ShoulderLeft => "left shoulder",
            ElbowLeft => "left elbow",
            WristLeft => "left wrist",
            HandLeft => "left hand",
            HandTipLeft => "left hand tip",
            ThumbLeft => "left thumb",
            ShoulderRight => "right shoulder",
            ElbowRight => "right elbow",
            WristRight => "right wrist",
            HandRight => "right hand",
            HandTipRight => "right hand tip",
            ThumbRight => "right thumb",
            HipLeft => "left hip",
            KneeLeft => "left knee",
            AnkleLeft => "left ankle",
            FootLeft => "left foot",
            HipRight => "right hip",
            KneeRight => "right knee",
            AnkleRight => "right ankle",
            FootRight => "right foot",
        }
    }
}

impl std::fmt::Display for JointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::fmt::Display for JointSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JointSide::Left => "left",
            JointSide::Right => "right",
        })
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Front => "front",
            Direction::Back => "back",
        })
    }
}

impl std::fmt::Display for RelativeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RelativeDirection::InFrontOfYour => "in front of your",
            RelativeDirection::BehindYour => "behind your",
            RelativeDirection::ToTheRightOfYour => "to the right of your",
            RelativeDirection::ToTheLeftOfYour => "to the left of your",
            RelativeDirection::OnTopOfYour => "on top of your",
            RelativeDirection::BelowYour => "below your",
        })
    }
}

// ── Body-part groups ────────────────────────────────────────────────
// The front end lowers part phrases ("your left arm", "your back")
// through these. An arm is the elbow and the wrist only: asking for an
// arm direction should not constrain where the hand points.

pub fn arm(side: JointSide) -> [JointType; 2] {
    [
        JointType::sided(SidedJointName::Wrist, side),
        JointType::sided(SidedJointName::Elbow, side),
    ]
}

pub fn arms() -> [JointType; 4] {
    [
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::ElbowRight,
        JointType::WristRight,
    ]
}

pub fn leg(side: JointSide) -> [JointType; 2] {
    [
        JointType::sided(SidedJointName::Knee, side),
        JointType::sided(SidedJointName::Ankle, side),
    ]
}

pub fn legs() -> [JointType; 4] {
    [
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::KneeRight,
        JointType::AnkleRight,
    ]
}

pub fn shoulders() -> [JointType; 2] {
    [JointType::ShoulderLeft, JointType::ShoulderRight]
}

pub fn hands() -> [JointType; 2] {
    [JointType::HandLeft, JointType::HandRight]
}

pub fn back() -> [JointType; 6] {
    [
        JointType::SpineMid,
        JointType::SpineShoulder,
        JointType::ShoulderLeft,
        JointType::ShoulderRight,
        JointType::HipLeft,
        JointType::HipRight,
    ]
}

/// The torso-and-head group addressed by the word "you".
pub fn you() -> [JointType; 8] {
    [
        JointType::SpineMid,
        JointType::SpineShoulder,
        JointType::ShoulderLeft,
        JointType::ShoulderRight,
        JointType::HipLeft,
        JointType::HipRight,
        JointType::Neck,
        JointType::Head,
    ]
}

/// Merge joint lists preserving first-seen order.
pub fn merge_joint_lists(lists: &[&[JointType]]) -> Vec<JointType> {
    let mut result = Vec::new();
    for list in lists {
        for &joint in *list {
            if !result.contains(&joint) {
                result.push(joint);
            }
        }
    }
    result
}
