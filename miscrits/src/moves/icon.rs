//! Ability icon resolution.
//!
//! Rules are evaluated top to bottom and the first one whose predicate holds
//! picks the icon. The `misc_*` rules only apply to `Misc` abilities; a Misc
//! ability none of them match falls through to `attack_element` and then
//! `fallback`.

use crate::config::ICON_BASE_URL;
use crate::moves::record::Ability;

pub const MISC: &str = "Misc";

/// The slice of an ability the rules read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconInput<'a> {
    pub kind: &'a str,
    pub element: &'a str,
    pub ap: f64,
    pub accuracy: bool,
    pub true_dmg: bool,
}

impl<'a> IconInput<'a> {
    pub fn from_ability(ability: &'a Ability) -> Self {
        Self {
            kind: ability.kind(),
            element: ability.element(),
            ap: ability.ap(),
            accuracy: ability.has_key("acc"),
            true_dmg: ability.true_dmg(),
        }
    }

    fn is_misc(&self) -> bool {
        self.element == MISC
    }
}

pub struct IconRule {
    pub name: &'static str,
    applies: fn(&IconInput) -> bool,
    icon: fn(&IconInput) -> String,
}

impl IconRule {
    pub fn applies(&self, input: &IconInput) -> bool {
        (self.applies)(input)
    }

    pub fn icon(&self, input: &IconInput) -> String {
        (self.icon)(input)
    }
}

fn fixed(name: &'static str) -> String {
    name.to_string()
}

pub static RULES: &[IconRule] = &[
    IconRule {
        name: "dot_poison",
        applies: |i| i.kind == "Dot" && !i.is_misc(),
        icon: |i| format!("{}_poison", i.element.to_lowercase()),
    },
    IconRule {
        name: "hot",
        applies: |i| i.kind == "Hot",
        icon: |_| fixed("heal"),
    },
    IconRule {
        name: "force_switch",
        applies: |i| i.kind == "ForceSwitch",
        icon: |_| fixed("confuse"),
    },
    IconRule {
        name: "true_damage",
        applies: |i| i.true_dmg,
        icon: |_| fixed("truedamage"),
    },
    IconRule {
        name: "misc_accuracy_buff",
        applies: |i| i.is_misc() && i.kind == "Buff" && i.ap > 0.0 && i.accuracy,
        icon: |_| fixed("accuracy_buff"),
    },
    IconRule {
        name: "misc_accuracy_debuff",
        applies: |i| i.is_misc() && i.kind == "Buff" && i.ap < 0.0 && i.accuracy,
        icon: |_| fixed("accuracy_debuff"),
    },
    IconRule {
        name: "misc_buff",
        applies: |i| i.is_misc() && i.kind == "Buff" && i.ap > 0.0,
        icon: |_| fixed("buff"),
    },
    IconRule {
        name: "misc_debuff",
        applies: |i| i.is_misc() && i.kind == "Buff" && i.ap < 0.0,
        icon: |_| fixed("debuff"),
    },
    IconRule {
        name: "misc_bot_buff",
        applies: |i| i.is_misc() && i.kind == "Bot" && i.ap > 0.0,
        icon: |_| fixed("bot_buff"),
    },
    IconRule {
        name: "misc_bot_debuff",
        applies: |i| i.is_misc() && i.kind == "Bot",
        icon: |_| fixed("bot_debuff"),
    },
    IconRule {
        name: "misc_heal",
        applies: |i| i.is_misc() && i.kind == "Heal",
        icon: |_| fixed("heal"),
    },
    IconRule {
        name: "attack_element",
        applies: |i| i.kind == "Attack",
        icon: |i| i.element.to_string(),
    },
    IconRule {
        name: "fallback",
        applies: |_| true,
        icon: |i| i.kind.to_string(),
    },
];

pub fn matching_rule(input: &IconInput) -> Option<&'static IconRule> {
    RULES.iter().find(|rule| rule.applies(input))
}

/// Falls back to the raw type if no rule matches.
pub fn resolve_input(input: &IconInput) -> String {
    match matching_rule(input) {
        Some(rule) => rule.icon(input),
        None => input.kind.to_string(),
    }
}

pub fn resolve_icon(ability: &Ability) -> String {
    resolve_input(&IconInput::from_ability(ability))
}

pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE_URL}/{}.png", icon.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ability(kind: &str, element: &str, ap: i64) -> Ability {
        Ability::new(1, "x").with_category(kind, element).with_ap(ap)
    }

    #[test]
    fn dot_uses_lowercase_element_poison() {
        assert_eq!(resolve_icon(&ability("Dot", "Fire", -10)), "fire_poison");
        assert_eq!(resolve_icon(&ability("Dot", "WaterWind", -5)), "waterwind_poison");
    }

    #[test]
    fn misc_dot_does_not_poison() {
        assert_eq!(resolve_icon(&ability("Dot", "Misc", -10)), "Dot");
    }

    #[test]
    fn status_types_beat_true_damage() {
        let hot = ability("Hot", "Nature", 5).with_true_dmg(true);
        let switch = ability("ForceSwitch", "Misc", 0).with_true_dmg(true);
        assert_eq!(resolve_icon(&hot), "heal");
        assert_eq!(resolve_icon(&switch), "confuse");
    }

    #[test]
    fn true_damage_beats_attack_element() {
        let attack = ability("Attack", "Fire", 20).with_true_dmg(true);
        assert_eq!(resolve_icon(&attack), "truedamage");
    }

    #[test]
    fn misc_buff_variants() {
        let acc_up = ability("Buff", "Misc", 5).with_keys(&["acc"]);
        let acc_down = ability("Buff", "Misc", -5).with_keys(&["acc"]);
        assert_eq!(resolve_icon(&acc_up), "accuracy_buff");
        assert_eq!(resolve_icon(&acc_down), "accuracy_debuff");
        assert_eq!(resolve_icon(&ability("Buff", "Misc", 5)), "buff");
        assert_eq!(resolve_icon(&ability("Buff", "Misc", -5)), "debuff");
        assert_eq!(resolve_icon(&ability("Bot", "Misc", 3)), "bot_buff");
        assert_eq!(resolve_icon(&ability("Bot", "Misc", 0)), "bot_debuff");
        assert_eq!(resolve_icon(&ability("Heal", "Misc", 10)), "heal");
    }

    #[test]
    fn zero_ap_misc_buff_falls_through_to_type() {
        let buff = ability("Buff", "Misc", 0);
        assert_eq!(
            matching_rule(&IconInput::from_ability(&buff)).map(|rule| rule.name),
            Some("fallback")
        );
        assert_eq!(resolve_icon(&buff), "Buff");
    }

    #[test]
    fn fractional_ap_keeps_its_sign() {
        let mut buff = ability("Buff", "Misc", 0);
        buff.set("ap", serde_json::Value::from(0.5));
        assert_eq!(resolve_icon(&buff), "buff");
        buff.set("ap", serde_json::Value::from(-0.5));
        assert_eq!(resolve_icon(&buff), "debuff");
    }

    #[test]
    fn every_input_matches_some_rule() {
        let inputs = [
            Ability::new(1, "bare"),
            ability("Unknown", "Misc", 0),
            ability("", "", 0),
        ];
        for input in &inputs {
            assert!(matching_rule(&IconInput::from_ability(input)).is_some());
        }
    }

    #[test]
    fn attack_returns_element_verbatim() {
        assert_eq!(resolve_icon(&ability("Attack", "NatureEarth", 30)), "NatureEarth");
        assert_eq!(resolve_icon(&Ability::new(2, "bare")), "Physical");
    }

    #[test]
    fn non_misc_buff_uses_type() {
        assert_eq!(resolve_icon(&ability("Buff", "Fire", 5)), "Buff");
    }

    #[test]
    fn url_lowercases_icon() {
        assert_eq!(icon_url("NatureEarth"), "https://worldofmiscrits.com/natureearth.png");
    }
}
