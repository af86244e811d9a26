// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[test]
fn empty_readings() {
    let r = Readings::new();
    assert!(r.is_empty());
    assert_eq!(r.len(), 0);
    assert_eq!(r.iter().count(), 0);
}

#[test]
fn iter_follows_canonical_order_not_insertion_order() {
    let r = Readings::new()
        .with(ChemicalType::Temperature, 80.0)
        .with(ChemicalType::Ph, 7.5)
        .with(ChemicalType::FreeChlorine, 3.0);

    let order: Vec<ChemicalType> = r.iter().map(|(c, _)| c).collect();
    assert_eq!(
        order,
        vec![
            ChemicalType::FreeChlorine,
            ChemicalType::Ph,
            ChemicalType::Temperature
        ]
    );
}

#[test]
fn set_get_remove() {
    let mut r = Readings::new();
    r.set(ChemicalType::Alkalinity, 100.0);
    assert_eq!(r.get(ChemicalType::Alkalinity), Some(100.0));
    assert_eq!(r.remove(ChemicalType::Alkalinity), Some(100.0));
    assert_eq!(r.get(ChemicalType::Alkalinity), None);
}

#[test]
fn parse_pairs_valid() {
    let r = Readings::parse_pairs(["free_chlorine=2.0", "ph=7.4", "alkalinity=100"]).unwrap();
    assert_eq!(r.free_chlorine, Some(2.0));
    assert_eq!(r.ph, Some(7.4));
    assert_eq!(r.alkalinity, Some(100.0));
    assert_eq!(r.len(), 3);
}

#[parameterized(
    missing_equals = { "ph7.4" },
    not_a_number = { "ph=abc" },
    infinite = { "ph=inf" },
    nan = { "ph=NaN" },
)]
fn parse_pairs_invalid_reading(input: &str) {
    let err = Readings::parse_pairs([input]).unwrap_err();
    assert!(matches!(err, Error::InvalidReading { .. }), "{:?}", err);
}

#[test]
fn parse_pairs_unknown_chemical() {
    let err = Readings::parse_pairs(["bromine=3"]).unwrap_err();
    assert!(matches!(err, Error::UnknownChemical(_)));
}

#[test]
fn parse_pairs_rejects_duplicates() {
    let err = Readings::parse_pairs(["ph=7.4", "PH=7.6"]).unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn deserializes_camel_case_keys() {
    let r: Readings =
        serde_json::from_str(r#"{"freeChlorine": 2.5, "cyanuricAcid": 40, "ph": 7.5}"#).unwrap();
    assert_eq!(r.free_chlorine, Some(2.5));
    assert_eq!(r.cyanuric_acid, Some(40.0));
    assert_eq!(r.ph, Some(7.5));
}

#[test]
fn serializes_only_present_readings() {
    let r = Readings::new().with(ChemicalType::Ph, 7.4);
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, r#"{"ph":7.4}"#);
}

#[test]
fn collects_from_pairs() {
    let r: Readings = [(ChemicalType::Ph, 7.4), (ChemicalType::Temperature, 80.0)]
        .into_iter()
        .collect();
    assert_eq!(r.len(), 2);
}
