//! Invoke message model tests
//!
//! Covers positional argument extraction, node serialization of each
//! parameter kind, and the codec paths an inbound message travels.

use proptest::prelude::*;
#[cfg(feature = "frame")]
use samchon_invoke::protocol::codec::{decode_frame, encode_frame};
use samchon_invoke::protocol::codec::{decode_text, encode_text};
use samchon_invoke::protocol::invoke::HISTORY_UID;
use samchon_invoke::protocol::{Invoke, Parameter, ParameterType, ParameterValue};
use samchon_invoke::util::node::Node;

#[test]
fn login_arguments_are_positional() {
    let invoke = Invoke::with_values("login", ["admin", "pwd123"]);
    let args = invoke.arguments();

    assert_eq!(
        args,
        vec![
            ParameterValue::String("admin".to_string()),
            ParameterValue::String("pwd123".to_string()),
        ]
    );
}

#[test]
fn history_uid_is_excluded_and_order_kept() {
    let invoke = Invoke::with_parameters(
        "render",
        vec![
            Parameter::new("first", 1),
            Parameter::new(HISTORY_UID, 99),
            Parameter::new("second", "b"),
            Parameter::new("third", 3),
        ],
    );

    let args = invoke.arguments();
    assert_eq!(args.len(), 3);
    assert_eq!(args[0].as_number(), Some(1.0));
    assert_eq!(args[1].as_str(), Some("b"));
    assert_eq!(args[2].as_number(), Some(3.0));
    assert_eq!(invoke.len(), 4, "bookkeeping parameter is still carried");
}

#[test]
fn numeric_parameter_survives_node_form() {
    let param = Parameter::new("id", 42);
    let restored = Parameter::from_node(&param.to_node());

    assert_eq!(restored.name(), "id");
    assert_eq!(restored.parameter_type(), ParameterType::Number);
    assert_eq!(restored.value(), &ParameterValue::Number(42.0));
}

#[test]
fn copy_is_deep_and_ordered() {
    let mut original = Invoke::with_values("sum", [1, 2, 3]);
    let copy = original.clone();
    original.push_value("extra", 4);

    assert_eq!(copy.len(), 3);
    let values: Vec<f64> = copy.iter().filter_map(|p| p.value().as_number()).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[test]
#[cfg(feature = "frame")]
fn binary_parameter_round_trips_one_way() {
    let mut invoke = Invoke::new("upload");
    invoke.push_value("file", "a.png");
    invoke.push_value("data", vec![0x89u8, 0x50, 0x4e, 0x47]);

    let frame = encode_frame(&invoke).expect("encode");
    let decoded = decode_frame(&frame, usize::MAX).expect("decode");

    assert_eq!(decoded.listener(), "upload");
    assert_eq!(decoded.parameters()[0], invoke.parameters()[0]);
    let data = &decoded.parameters()[1];
    assert_eq!(data.name(), "data");
    assert_eq!(data.parameter_type(), ParameterType::Binary);
    assert_eq!(data.value().as_bytes(), Some(&[][..]));
}

#[test]
fn empty_listener_is_still_present() {
    let invoke = Invoke::new("");
    let node = invoke.to_node();
    assert_eq!(node.property("listener"), Some(""));

    let decoded = decode_text(&encode_text(&invoke)).expect("decode");
    assert_eq!(decoded.listener(), "");
    assert!(decoded.is_empty());
}

#[test]
fn structured_parameter_nests_node() {
    let member = Node::new("member")
        .with_property("id", "admin")
        .with_child(Node::new("group").with_value("ops"));
    let invoke = Invoke::with_values("setMember", [member.clone()]);

    let decoded = decode_text(&encode_text(&invoke)).expect("decode");
    assert_eq!(decoded.parameters()[0].value().as_node(), Some(&member));
}

fn number_strategy() -> impl Strategy<Value = f64> {
    use proptest::num::f64 as float;
    prop_oneof![
        any::<i64>().prop_map(|n| n as f64),
        Just(-0.0f64),
        float::POSITIVE | float::NEGATIVE | float::NORMAL | float::SUBNORMAL | float::ZERO | float::INFINITE,
    ]
}

fn parameter_strategy() -> impl Strategy<Value = Parameter> {
    let name = "[a-z_]{0,8}";
    prop_oneof![
        (name, "[ -~]{0,16}").prop_map(|(n, s)| Parameter::new(n, s)),
        (name, number_strategy()).prop_map(|(n, x)| Parameter::new(n, x)),
        (name, "[a-z]{1,6}", "[a-z0-9]{0,6}").prop_map(|(n, tag, text)| {
            Parameter::new(n, Node::new(tag).with_property("k", text.clone()).with_value(text))
        }),
    ]
}

fn invoke_strategy() -> impl Strategy<Value = Invoke> {
    (
        "[a-zA-Z]{0,12}",
        proptest::collection::vec(parameter_strategy(), 0..6),
    )
        .prop_map(|(listener, params)| Invoke::with_parameters(listener, params))
}

proptest! {
    #[test]
    fn text_round_trip_preserves_invoke(invoke in invoke_strategy()) {
        prop_assert_eq!(decode_text(&encode_text(&invoke)).unwrap(), invoke);
    }

    #[test]
    #[cfg(feature = "frame")]
    fn frame_round_trip_preserves_invoke(invoke in invoke_strategy()) {
        let frame = encode_frame(&invoke).unwrap();
        prop_assert_eq!(decode_frame(&frame, usize::MAX).unwrap(), invoke);
    }
}
