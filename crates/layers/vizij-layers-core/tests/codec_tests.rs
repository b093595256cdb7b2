use vizij_layers_core::{
    codec::{decode, encode, records_from_json, KeyRecord},
    curve::{Curve, CurveTarget},
    keyframe::{ConstantMode, Interpolation, KeyTime, Keyframe, TangentMode},
    LayersError,
};

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-9, "left={a} right={b}");
}

/// CurveTarget that forwards to a Curve and logs every setter call.
#[derive(Default)]
struct RecordingTarget {
    curve: Curve,
    calls: Vec<String>,
}

impl CurveTarget for RecordingTarget {
    fn clear(&mut self) {
        self.calls.push("clear".into());
        self.curve.clear();
    }

    fn add_key(&mut self, time: KeyTime, value: f64) -> usize {
        self.calls.push(format!("add_key {}", time.ticks()));
        self.curve.add_key(time, value)
    }

    fn set_interpolation(&mut self, index: usize, interpolation: Interpolation) {
        self.calls.push(format!("interpolation {index}"));
        self.curve.set_interpolation(index, interpolation);
    }

    fn set_tangent_mode(&mut self, index: usize, tangent_mode: TangentMode) {
        self.calls.push(format!("tangent_mode {index}"));
        self.curve.set_tangent_mode(index, tangent_mode);
    }

    fn set_constant_mode(&mut self, index: usize, constant_mode: ConstantMode) {
        self.calls.push(format!("constant_mode {index}"));
        self.curve.set_constant_mode(index, constant_mode);
    }

    fn set_left_derivative(&mut self, index: usize, derivative: f64) {
        self.calls.push(format!("left_derivative {index}"));
        self.curve.set_left_derivative(index, derivative);
    }

    fn set_right_derivative(&mut self, index: usize, derivative: f64) {
        self.calls.push(format!("right_derivative {index}"));
        self.curve.set_right_derivative(index, derivative);
    }

    fn set_left_weight(&mut self, index: usize, weight: f64) {
        self.calls.push(format!("left_weight {index}"));
        self.curve.set_left_weight(index, weight);
    }

    fn set_right_weight(&mut self, index: usize, weight: f64) {
        self.calls.push(format!("right_weight {index}"));
        self.curve.set_right_weight(index, weight);
    }
}

fn weighted_curve() -> Curve {
    Curve::from_keys(vec![
        Keyframe::new(KeyTime(0), 1.0)
            .with_tangent_mode(TangentMode::User)
            .with_derivatives(0.5, 0.75)
            .with_weights(0.2, 0.6),
        Keyframe::new(KeyTime(1_539_538_600), -2.0)
            .with_interpolation(Interpolation::Linear)
            .with_tangent_mode(TangentMode::Break)
            .with_constant_mode(ConstantMode::Next)
            .with_derivatives(-1.0, 3.0)
            .with_weights(0.45, 0.1),
        Keyframe::new(KeyTime(3_079_077_200), 4.0)
            .with_interpolation(Interpolation::Constant)
            .with_tangent_mode(TangentMode::ClampProgressive)
            .with_derivatives(0.0, 0.0)
            .with_weights(0.5, 0.5),
    ])
}

/// it should reproduce every field for supported tangent modes and explicit weights
#[test]
fn roundtrip_preserves_supported_curves() {
    let original = weighted_curve();
    let records = encode(&original);
    assert_eq!(records.len(), 3);

    let mut rebuilt = Curve::new();
    decode(&mut rebuilt, &records).unwrap();
    assert_eq!(rebuilt.len(), original.len());
    for (a, b) in original.keys().iter().zip(rebuilt.keys()) {
        assert_eq!(a.time, b.time);
        assert_eq!(a.interpolation, b.interpolation);
        assert_eq!(a.tangent_mode, b.tangent_mode);
        assert_eq!(a.constant_mode, b.constant_mode);
        approx(a.value, b.value);
        approx(a.left_derivative, b.left_derivative);
        approx(a.right_derivative, b.right_derivative);
        approx(a.left_weight, b.left_weight);
        approx(a.right_weight, b.right_weight);
    }
}

/// it should never write default weights back to the target
#[test]
fn default_weights_are_not_written() {
    let source = Curve::from_keys(vec![
        Keyframe::new(KeyTime(0), 0.0).with_weights(0.33333, 0.3333333333),
        Keyframe::new(KeyTime(10), 1.0).with_weights(0.3333, 0.5),
    ]);
    let mut target = RecordingTarget::default();
    decode(&mut target, &encode(&source)).unwrap();

    let weight_calls: Vec<&String> = target
        .calls
        .iter()
        .filter(|c| c.contains("weight"))
        .collect();
    // 0.3333 sits just outside the default band, so only it and 0.5 are written
    assert_eq!(weight_calls, vec!["left_weight 1", "right_weight 1"]);
}

/// it should insert every key before touching derivatives or weights
#[test]
fn keys_are_placed_before_tangents() {
    let mut target = RecordingTarget::default();
    decode(&mut target, &encode(&weighted_curve())).unwrap();

    assert_eq!(target.calls[0], "clear");
    let last_add = target
        .calls
        .iter()
        .rposition(|c| c.starts_with("add_key"))
        .unwrap();
    let first_derivative = target
        .calls
        .iter()
        .position(|c| c.contains("derivative"))
        .unwrap();
    assert!(last_add < first_derivative);
}

/// it should downgrade TCB tangents to broken tangents
#[test]
fn tcb_tangents_decode_as_break() {
    let source = Curve::from_keys(vec![
        Keyframe::new(KeyTime(0), 0.0).with_tangent_mode(TangentMode::Tcb),
        Keyframe::new(KeyTime(5), 1.0).with_tangent_mode(TangentMode::Auto),
    ]);
    let records = encode(&source);
    assert_eq!(records[0].tangent_mode, i64::from(TangentMode::Tcb.code()));

    let mut rebuilt = Curve::new();
    decode(&mut rebuilt, &records).unwrap();
    assert_eq!(rebuilt.keys()[0].tangent_mode, TangentMode::Break);
    assert_eq!(rebuilt.keys()[1].tangent_mode, TangentMode::Auto);
}

/// it should replace existing keys instead of merging
#[test]
fn decode_clears_the_target_first() {
    let mut target = Curve::from_keys(vec![
        Keyframe::new(KeyTime(-100), 9.0),
        Keyframe::new(KeyTime(7), 9.0),
    ]);
    let records = encode(&Curve::from_keys(vec![Keyframe::new(KeyTime(3), 1.0)]));
    decode(&mut target, &records).unwrap();
    assert_eq!(target.len(), 1);
    assert_eq!(target.keys()[0].time, KeyTime(3));
}

/// it should reject unsorted records and unknown enum codes as malformed input
#[test]
fn malformed_records_are_rejected() {
    let mut good = encode(&weighted_curve());
    good.swap(0, 2);
    let err = decode(&mut Curve::new(), &good).unwrap_err();
    assert!(matches!(err, LayersError::MalformedInput { .. }));

    let mut bad_tangent: Vec<KeyRecord> = encode(&weighted_curve());
    bad_tangent[1].tangent_mode = 42;
    let err = decode(&mut Curve::new(), &bad_tangent).unwrap_err();
    assert_eq!(err.category(), "input");

    let mut nan = encode(&weighted_curve());
    nan[0].value = f64::NAN;
    assert!(decode(&mut Curve::new(), &nan).is_err());
}

/// it should parse codes past the byte range and reject them on decode
#[test]
fn out_of_range_codes_are_malformed_not_parse_errors() {
    let mut records = encode(&weighted_curve());
    records[0].interpolation = 300;
    records[2].constant_mode = -1;
    let json = serde_json::to_string(&records).unwrap();

    let parsed = records_from_json(&json).unwrap();
    assert_eq!(parsed[0].interpolation, 300);
    let mut target = Curve::from_keys(vec![Keyframe::new(KeyTime(1), 1.0)]);
    let err = decode(&mut target, &parsed).unwrap_err();
    assert!(matches!(err, LayersError::MalformedInput { .. }));
    assert_eq!(target.len(), 1);

    records[0].interpolation = i64::from(Interpolation::Cubic.code());
    let err = decode(&mut Curve::new(), &records).unwrap_err();
    assert_eq!(err.category(), "input");
}

/// it should decode the mixed-tangent fixture with TCB downgraded and weights kept
#[test]
fn mixed_tangent_fixture_decodes() {
    let json = vizij_test_fixtures::curves::json("mixed-tangents").unwrap();
    let records = records_from_json(&json).unwrap();
    let mut curve = Curve::new();
    decode(&mut curve, &records).unwrap();

    assert_eq!(curve.len(), 3);
    assert_eq!(curve.keys()[0].tangent_mode, TangentMode::Break);
    approx(curve.keys()[1].left_weight, 0.2);
    approx(curve.keys()[1].right_weight, 0.6);
    assert_eq!(curve.keys()[2].constant_mode, ConstantMode::Next);
    assert_eq!(curve.keys()[2].interpolation, Interpolation::Linear);
}

/// it should encode an empty curve as an empty record list
#[test]
fn empty_curve_encodes_to_nothing() {
    assert!(encode(&Curve::new()).is_empty());
}
