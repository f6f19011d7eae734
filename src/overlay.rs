use crate::core::EffectPhase;
use crate::dom::set_body_class;

pub const ACTIVE_CLASS: &str = "ambient-active";
pub const FADING_CLASS: &str = "ambient-fading";

/// Mirror the effect gate onto body classes read by the decorative
/// background layer.
#[inline]
pub fn apply_effect_phase(phase: EffectPhase) {
    set_body_class(ACTIVE_CLASS, phase.is_active());
    set_body_class(FADING_CLASS, phase == EffectPhase::FadingOut);
}

#[inline]
pub fn clear() {
    apply_effect_phase(EffectPhase::Idle);
}
