#[cfg(test)]
mod tests {
    use pgcall::{
        AsValue, DEFAULT_VARCHAR_SIZE, DbError, Direction, Params, Value, WireType,
    };
    use rust_decimal::Decimal;
    use time::{Date, Month, PrimitiveDateTime, Time};

    #[test]
    fn wire_type_inference() {
        let mut params = Params::new();
        params.add("a", true).unwrap();
        params.add("b", 1_i16).unwrap();
        params.add("c", 2_i32).unwrap();
        params.add("d", 3_i64).unwrap();
        params.add("e", 1.5_f32).unwrap();
        params.add("f", 2.5_f64).unwrap();
        params.add("g", Decimal::from(9)).unwrap();
        params.add("h", "text").unwrap();
        params.add("i", vec![1_u8, 2]).unwrap();
        params.add("j", vec![4_i32, 5]).unwrap();
        let expected = [
            WireType::Boolean,
            WireType::Smallint,
            WireType::Integer,
            WireType::Bigint,
            WireType::Real,
            WireType::Double,
            WireType::Numeric,
            // Plain strings infer as text, not varchar.
            WireType::Text,
            WireType::Bytea,
            WireType::Array(Box::new(WireType::Integer)),
        ];
        for (param, expected) in params.iter().zip(&expected) {
            assert_eq!(param.wire_type(), expected, "parameter {}", param.name());
        }
    }

    #[test]
    fn inference_of_temporal_types() {
        let date = Date::from_calendar_date(2024, Month::June, 1).unwrap();
        let mut params = Params::new();
        params.add("d", date).unwrap();
        params.add("t", Time::from_hms(8, 0, 0).unwrap()).unwrap();
        params
            .add("ts", PrimitiveDateTime::new(date, Time::MIDNIGHT))
            .unwrap();
        assert_eq!(params.get("d").unwrap().wire_type(), &WireType::Date);
        assert_eq!(params.get("t").unwrap().wire_type(), &WireType::Time);
        assert_eq!(params.get("ts").unwrap().wire_type(), &WireType::Timestamp);
    }

    #[test]
    fn null_binds_as_unknown() {
        let mut params = Params::new();
        params.add("a", Value::Null).unwrap();
        params.add("b", None::<i32>).unwrap();
        assert_eq!(params.get("a").unwrap().wire_type(), &WireType::Unknown);
        // A typed None keeps its inferred wire type.
        assert_eq!(params.get("b").unwrap().wire_type(), &WireType::Integer);
        assert!(params.get("b").unwrap().value().is_null());
    }

    #[test]
    fn unsupported_type_fails_at_add_time() {
        let mut params = Params::new();
        let result = params.add("a", Value::Unknown(Some("?".into())));
        assert!(matches!(result, Err(DbError::UnsupportedType(..))));
        assert!(params.is_empty());
    }

    #[test]
    fn min_timestamp_is_null_sentinel() {
        let mut params = Params::new();
        params.add("ts", PrimitiveDateTime::MIN).unwrap();
        let param = params.get("ts").unwrap();
        assert!(param.value().is_null());
        assert_eq!(param.wire_type(), &WireType::Timestamp);
    }

    #[test]
    fn empty_string_is_null_only_for_declared_text() {
        let mut params = Params::new();
        params.add("kept", "").unwrap();
        params.add_with_type("dropped", "", WireType::Varchar).unwrap();
        params.add_with_type("dropped2", "", WireType::Text).unwrap();
        assert_eq!(
            params.get("kept").unwrap().value(),
            &Value::Varchar(Some("".into()))
        );
        assert!(params.get("dropped").unwrap().value().is_null());
        assert!(params.get("dropped2").unwrap().value().is_null());
    }

    #[test]
    fn min_double_is_null_only_for_declared_double() {
        let mut params = Params::new();
        params.add("kept", f64::MIN).unwrap();
        params
            .add_with_type("dropped", f64::MIN, WireType::Double)
            .unwrap();
        assert_eq!(
            params.get("kept").unwrap().value(),
            &Value::Float64(Some(f64::MIN))
        );
        assert!(params.get("dropped").unwrap().value().is_null());
    }

    #[test]
    fn varchar_size_resolution() {
        let mut params = Params::new();
        params
            .add_with_type("input", "abcde", WireType::Varchar)
            .unwrap();
        params.add_sized("explicit", "abc", 512).unwrap();
        params
            .add_out_param_sized("out", "", 64, WireType::Varchar)
            .unwrap();
        params.add_out_param("out_default", "x").unwrap();
        assert_eq!(params.get("input").unwrap().size(), Some(5));
        assert_eq!(params.get("explicit").unwrap().size(), Some(512));
        assert_eq!(params.get("out").unwrap().size(), Some(64));
        assert_eq!(
            params.get("out_default").unwrap().size(),
            Some(DEFAULT_VARCHAR_SIZE)
        );
        // Non-varchar parameters carry no size.
        params.add("n", 1_i32).unwrap();
        assert_eq!(params.get("n").unwrap().size(), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut params = Params::new();
        params.add("a", 1_i32).unwrap();
        let result = params.add("a", 2_i32);
        assert!(matches!(result, Err(DbError::DuplicateParameter(..))));
        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("a").unwrap().value(),
            &Value::Int32(Some(1))
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut params = Params::new();
        params.add("z", 1_i32).unwrap();
        params.add("a", 2_i32).unwrap();
        params.add("m", 3_i32).unwrap();
        let names = params.iter().map(|p| p.name()).collect::<Vec<_>>();
        assert_eq!(names, ["z", "a", "m"]);
        assert!(params.contains("a"));
        assert!(!params.contains("x"));
    }

    #[test]
    fn out_param_read_back() {
        let mut params = Params::new();
        params.add_out_param("counter", 5_i32).unwrap();
        params.add("by", 3_i32).unwrap();
        assert_eq!(
            params.get("counter").unwrap().direction(),
            Direction::InputOutput
        );
        assert_eq!(params.out_param::<i32>("counter").unwrap(), Some(5));
        // Mismatched target type degrades to None, never panics.
        assert_eq!(params.out_param::<Date>("counter").unwrap(), None);
        assert!(matches!(
            params.out_param::<i32>("missing"),
            Err(DbError::ParameterNotFound(..))
        ));
        assert!(matches!(
            params.out_param::<i32>("by"),
            Err(DbError::NotAnOutputParameter(..))
        ));
    }

    #[test]
    fn update_out_param_defaults_on_null() {
        let mut params = Params::new();
        params.add_out_param("n", None::<i32>).unwrap();
        params.add_out_param("s", Some("x".to_string())).unwrap();
        let mut n = 42_i32;
        params.update_out_param("n", &mut n).unwrap();
        assert_eq!(n, 0);
        let mut s = String::new();
        params.update_out_param("s", &mut s).unwrap();
        assert_eq!(s, "x");
        let mut ts = Some(PrimitiveDateTime::MIN);
        params
            .add_out_param("ts", None::<PrimitiveDateTime>)
            .unwrap();
        params.update_out_param_opt("ts", &mut ts).unwrap();
        assert_eq!(ts, None);
    }

    #[test]
    fn null_out_param_reads_as_none() {
        let mut params = Params::new();
        params.add_out_param("v", None::<f64>).unwrap();
        assert_eq!(params.out_param::<f64>("v").unwrap(), None);
    }

    #[test]
    fn list_round_trip_through_param() {
        let mut params = Params::new();
        params.add("ids", vec![7_i64, 8, 9]).unwrap();
        let value = params.get("ids").unwrap().value().clone();
        assert_eq!(Vec::<i64>::try_from_value(value).unwrap(), vec![7, 8, 9]);
    }
}
