use diffmap_common::BlockOutcome;

/// Classify one step given the bytes each side produced for it.
///
/// An empty slice means that side had nothing left. When both sides produced
/// data of different lengths (one side ended mid-block) the step is
/// `Differing` even if the shorter side is a prefix of the longer one.
pub fn classify(left: &[u8], right: &[u8]) -> BlockOutcome {
    if left.len() != right.len() {
        if left.is_empty() {
            return BlockOutcome::LeftExhausted;
        }
        if right.is_empty() {
            return BlockOutcome::RightExhausted;
        }
        return BlockOutcome::Differing;
    }

    if left == right {
        BlockOutcome::Identical
    } else {
        BlockOutcome::Differing
    }
}
