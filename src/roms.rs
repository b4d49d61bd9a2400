// Named title catalogue and the offset table for each one's ROM segments.
// The crate never touches the filesystem itself: `load_segments` takes a
// caller-supplied `read_segment` closure, keeping byte-blob production an
// external collaborator the way the spec requires.

use crate::memory::Memory;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameTitle {
    SpaceInvaders,
    SpaceInvadersDeluxe,
    BalloonBomber,
    LunarRescue,
}

pub struct Segment {
    pub label: &'static str,
    pub offset: u16,
}

impl GameTitle {
    pub fn segments(self) -> &'static [Segment] {
        const SI: [Segment; 4] =
            [Segment { label: "invaders.h", offset: 0x0000 }, Segment { label: "invaders.g", offset: 0x0800 }, Segment { label: "invaders.f", offset: 0x1000 }, Segment { label: "invaders.e", offset: 0x1800 }];
        const SID: [Segment; 4] = [
            Segment { label: "invdelux.h", offset: 0x0000 },
            Segment { label: "invdelux.g", offset: 0x0800 },
            Segment { label: "invdelux.f", offset: 0x1000 },
            Segment { label: "invdelux.e", offset: 0x1800 },
        ];
        const BB: [Segment; 5] = [
            Segment { label: "tn01", offset: 0x0000 },
            Segment { label: "tn02", offset: 0x0800 },
            Segment { label: "tn03", offset: 0x1000 },
            Segment { label: "tn04", offset: 0x1800 },
            Segment { label: "tn05-1", offset: 0x4000 },
        ];
        const LR: [Segment; 6] = [
            Segment { label: "lr1", offset: 0x0000 },
            Segment { label: "lr2", offset: 0x0800 },
            Segment { label: "lr3", offset: 0x1000 },
            Segment { label: "lr4", offset: 0x1800 },
            Segment { label: "lr5", offset: 0x4000 },
            Segment { label: "lr6", offset: 0x4800 },
        ];
        match self {
            GameTitle::SpaceInvaders => &SI,
            GameTitle::SpaceInvadersDeluxe => &SID,
            GameTitle::BalloonBomber => &BB,
            GameTitle::LunarRescue => &LR,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameTitle::SpaceInvaders => "Space Invaders",
            GameTitle::SpaceInvadersDeluxe => "Space Invaders Deluxe",
            GameTitle::BalloonBomber => "Balloon Bomber",
            GameTitle::LunarRescue => "Lunar Rescue",
        }
    }

    pub fn from_menu_choice(choice: u8) -> Option<Self> {
        match choice {
            1 => Some(GameTitle::SpaceInvaders),
            2 => Some(GameTitle::SpaceInvadersDeluxe),
            3 => Some(GameTitle::BalloonBomber),
            4 => Some(GameTitle::LunarRescue),
            _ => None,
        }
    }
}

/// Stamps each segment's bytes, obtained from `read_segment`, into `memory`
/// at its documented offset. Bypasses the write guard the way ROM loading
/// must.
pub fn load_segments(memory: &mut Memory, title: GameTitle, mut read_segment: impl FnMut(&str) -> anyhow::Result<Vec<u8>>) -> anyhow::Result<()> {
    for segment in title.segments() {
        let bytes = read_segment(segment.label).map_err(|e| anyhow::anyhow!("failed to load ROM segment '{}': {}", segment.label, e))?;
        memory.load(segment.offset as usize, &bytes);
    }
    Ok(())
}
