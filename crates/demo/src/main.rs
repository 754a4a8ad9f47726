//! RPG walkthrough for the attribute engine.
//!
//! Builds a hero and an enchanted sword from RON content, equips the sword,
//! spends some mana, then unequips and shows the hero back at baseline.
//! Run with `RUST_LOG=debug` to also see rejected modifier applications.

use std::path::Path;
use std::sync::Arc;

use attributes_content::{DefinitionsLoader, SystemFactory, TemplateLoader};
use attributes_core::{AttachedModifier, AttributeObserver, AttributeSystem, SystemId};
use tracing_subscriber::EnvFilter;

/// Attribute vocabulary shared by every entity in the demo.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
enum RpgAttribute {
    Health,
    Mana,
    Shield,
    AttackPower,
    SpellPower,
    MovementSpeed,
    AttackSpeed,
}

/// Logs every structural change on the hero's system.
struct ChangeLog;

impl AttributeObserver<RpgAttribute> for ChangeLog {
    fn modifier_attached(&self, target: &RpgAttribute, modifier: &AttachedModifier<RpgAttribute>) {
        tracing::info!(
            target_attribute = %target,
            source = %modifier.origin.system,
            "modifier attached"
        );
    }

    fn modifier_detached(&self, target: &RpgAttribute, modifier: &AttachedModifier<RpgAttribute>) {
        tracing::info!(
            target_attribute = %target,
            source = %modifier.origin.system,
            "modifier detached"
        );
    }

    fn capacity_changed(&self, attribute: &RpgAttribute, new_value: f32, old_value: f32) {
        tracing::info!(
            attribute = %attribute,
            old_value,
            new_value,
            "capacity changed"
        );
    }
}

fn report(label: &str, system: &AttributeSystem<RpgAttribute>) {
    for attribute in system.attributes() {
        tracing::info!(
            phase = label,
            attribute = %attribute.id(),
            value = attribute.value(),
            capacity = attribute.capacity(),
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let content = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");

    let catalog = DefinitionsLoader::load::<RpgAttribute>(&content.join("definitions.ron"))?;
    let factory = SystemFactory::new(catalog)?;

    let mut hero = factory.build(
        SystemId(1),
        &TemplateLoader::load(&content.join("hero.ron"))?,
    )?;
    hero.register_observer(Arc::new(ChangeLog));

    let sword = factory.build(
        SystemId(2),
        &TemplateLoader::load(&content.join("sword.ron"))?,
    )?;

    report("baseline", &hero);

    tracing::info!("equipping sword");
    hero.add_modifiers(&sword);
    report("equipped", &hero);

    tracing::info!("casting a spell for 40 mana");
    hero.capacity_remove(&RpgAttribute::Mana, 40.0)?;

    if let Err(error) = hero.capacity_add(&RpgAttribute::Mana, 10_000.0) {
        tracing::warn!(%error, "mana overfill rejected");
    }

    tracing::info!("unequipping sword");
    hero.remove_modifiers(sword.id());
    report("unequipped", &hero);

    Ok(())
}
