//! # Property-Based Tests
//!
//! Verification of the identity-space invariants using proptest.
//!
//! These tests ensure the dedup index and id allocation stay consistent
//! under arbitrary membership sets and operation orders.

use glyphnest_core::{
    BuiltCompound, Glyph, GlyphAdministration, GlyphLayer, GlyphSignature, Grade, Nest, Rectangle,
    RegionGraph, Section, SectionId, Shape,
};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use std::collections::BTreeSet;

const SECTION_COUNT: u32 = 32;

fn regions() -> RegionGraph {
    let mut graph = RegionGraph::new();
    for i in 1..=SECTION_COUNT {
        graph.insert_section(Section::new(
            SectionId(i),
            Rectangle::new((i as i32) * 10, 0, 10, 10),
        ));
    }
    graph
}

fn transient(nest: &Nest, sections: &BTreeSet<SectionId>) -> Glyph {
    match nest
        .build_compound(GlyphLayer::Default, sections, true)
        .expect("build")
    {
        BuiltCompound::Transient(g) => g,
        BuiltCompound::Existing(id) => unreachable!("require_unique built existing {id:?}"),
    }
}

fn section_set() -> impl Strategy<Value = BTreeSet<SectionId>> {
    btree_set((1..=SECTION_COUNT).prop_map(SectionId), 1..8)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Structurally identical candidates resolve to one canonical glyph.
    #[test]
    fn deduplication_idempotence(sections in section_set()) {
        let mut nest = Nest::new(regions());

        let first = nest.register(transient(&nest, &sections)).expect("register");
        let second = nest.register(transient(&nest, &sections)).expect("register");

        prop_assert_eq!(first, second);
        prop_assert_eq!(nest.glyph_count(), 1);
    }

    /// Registering an already-registered glyph is a no-op returning itself.
    #[test]
    fn registration_idempotence(sections in section_set()) {
        let mut nest = Nest::new(regions());

        let id = nest.register(transient(&nest, &sections)).expect("register");
        let registered = nest.glyph(id).expect("lookup").clone();
        let again = nest.register(registered).expect("register");

        prop_assert_eq!(id, again);
        prop_assert_eq!(nest.glyph_count(), 1);
    }

    /// Once assigned, a glyph's id survives every later operation on it.
    #[test]
    fn identity_stability(
        sections in section_set(),
        reassignments in vec(prop_oneof![
            Just(Some(Shape::NoteHead)),
            Just(Some(Shape::Stem)),
            Just(Some(Shape::Noise)),
            Just(None),
        ], 0..10)
    ) {
        let mut nest = Nest::new(regions());
        let id = nest.register(transient(&nest, &sections)).expect("register");

        for shape in reassignments {
            let glyph = nest.glyph_mut(id).expect("lookup");
            glyph.set_shape(shape, Grade::Algorithmic);
            prop_assert_eq!(glyph.id(), Some(id));
        }

        prop_assert_eq!(nest.glyph(id).expect("lookup").id(), Some(id));
    }

    /// Membership signatures are order-independent.
    #[test]
    fn signature_order_independence(ids in vec(1u32..=SECTION_COUNT, 1..10)) {
        let forward = GlyphSignature::new(ids.iter().map(|&i| SectionId(i)));
        let reverse = GlyphSignature::new(ids.iter().rev().map(|&i| SectionId(i)));

        prop_assert_eq!(forward, reverse);
    }

    /// Ids are allocated sequentially and never reused for distinct
    /// memberships.
    #[test]
    fn distinct_memberships_get_distinct_ids(count in 1u32..=SECTION_COUNT) {
        let mut nest = Nest::new(regions());

        let mut ids = Vec::new();
        for i in 1..=count {
            let sections: BTreeSet<_> = [SectionId(i)].into_iter().collect();
            ids.push(nest.register(transient(&nest, &sections)).expect("register"));
        }

        let unique: BTreeSet<_> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert_eq!(nest.glyph_count(), count as usize);
    }
}
