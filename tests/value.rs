#[cfg(test)]
mod tests {
    use pgcall::{AsValue, Value};
    use rust_decimal::Decimal;
    use time::{Date, Month, PrimitiveDateTime, Time};

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert!(Value::Null.is_null());
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
    }

    #[test]
    fn value_bool() {
        let val = true.as_value();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(Some(false)));
        assert_ne!(val, Value::Boolean(None));
        let var: bool = AsValue::try_from_value(val).unwrap();
        assert_eq!(var, true);
        assert_eq!(bool::try_from_value(1_i16.as_value()).unwrap(), true);
        assert_eq!(bool::try_from_value(0_i32.as_value()).unwrap(), false);
        assert_eq!(bool::try_from_value(9_i64.as_value()).unwrap(), true);
        assert!(bool::try_from_value(0.5_f32.as_value()).is_err());
    }

    #[test]
    fn value_i16() {
        let val = (-32768_i16).as_value();
        assert_eq!(val, Value::Int16(Some(-32768)));
        assert_ne!(val, Value::Int32(Some(-32768)));
        let var: i16 = AsValue::try_from_value(val).unwrap();
        assert_eq!(var, -32768);
        assert_eq!(i16::try_from_value(5000_i32.as_value()).unwrap(), 5000);
        assert_eq!(i16::try_from_value((-1_i64).as_value()).unwrap(), -1);
        // Out of range does not truncate.
        assert!(i16::try_from_value(70000_i32.as_value()).is_err());
    }

    #[test]
    fn value_i32() {
        let val = (-2147483648_i32).as_value();
        assert_eq!(val, Value::Int32(Some(-2147483648)));
        let var: i32 = AsValue::try_from_value(val).unwrap();
        assert_eq!(var, -2147483648);
        assert_eq!(i32::try_from_value((-31_i16).as_value()).unwrap(), -31);
        assert_eq!(i32::try_from_value(123456_i64.as_value()).unwrap(), 123456);
        assert_eq!(
            i32::try_from_value(Decimal::from(77).as_value()).unwrap(),
            77
        );
        assert!(i32::try_from_value(i64::MAX.as_value()).is_err());
        assert!(i32::try_from_value("12".as_value()).is_err());
    }

    #[test]
    fn value_i64() {
        let val = 9223372036854775807_i64.as_value();
        let var: i64 = AsValue::try_from_value(val).unwrap();
        assert_eq!(var, 9223372036854775807);
        assert_eq!(i64::try_from_value((-1234_i16).as_value()).unwrap(), -1234);
        assert_eq!(i64::try_from_value((-1_i32).as_value()).unwrap(), -1);
    }

    #[test]
    fn value_float() {
        assert_eq!(1.5_f32.as_value(), Value::Float32(Some(1.5)));
        assert_eq!(f64::try_from_value(1.5_f32.as_value()).unwrap(), 1.5);
        assert_eq!(f64::try_from_value(3_i32.as_value()).unwrap(), 3.0);
        assert_eq!(
            f64::try_from_value(Decimal::new(25, 1).as_value()).unwrap(),
            2.5
        );
        assert!(f64::try_from_value(true.as_value()).is_err());
    }

    #[test]
    fn value_decimal() {
        let val = Decimal::new(12345, 2).as_value();
        assert_eq!(val, Value::Decimal(Some(Decimal::new(12345, 2))));
        let var: Decimal = AsValue::try_from_value(val).unwrap();
        assert_eq!(var.to_string(), "123.45");
        assert_eq!(
            Decimal::try_from_value(7_i64.as_value()).unwrap(),
            Decimal::from(7)
        );
        assert_eq!(
            Decimal::try_from_value(0.25_f64.as_value()).unwrap(),
            Decimal::new(25, 2)
        );
    }

    #[test]
    fn value_char_and_string() {
        assert_eq!('x'.as_value(), Value::Char(Some('x')));
        assert_eq!(String::try_from_value('x'.as_value()).unwrap(), "x");
        assert_eq!(char::try_from_value("y".as_value()).unwrap(), 'y');
        assert!(char::try_from_value("yy".as_value()).is_err());
        let val = "hello".as_value();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        assert_eq!(String::try_from_value(val).unwrap(), "hello");
        assert!(String::try_from_value(1_i32.as_value()).is_err());
    }

    #[test]
    fn value_blob() {
        let val = vec![0x0A_u8, 0x0B, 0xFF].as_value();
        assert_eq!(val, Value::Blob(Some(vec![0x0A, 0x0B, 0xFF].into())));
        // Blobs render as upper-case hex, not text.
        assert_eq!(val.to_text().unwrap(), "0A0BFF");
        assert_eq!(
            Vec::<u8>::try_from_value(val).unwrap(),
            vec![0x0A, 0x0B, 0xFF]
        );
    }

    #[test]
    fn value_temporal() {
        let date = Date::from_calendar_date(2024, Month::March, 15).unwrap();
        let time = Time::from_hms(13, 30, 0).unwrap();
        let ts = PrimitiveDateTime::new(date, time);
        assert_eq!(date.as_value(), Value::Date(Some(date)));
        assert_eq!(ts.as_value(), Value::Timestamp(Some(ts)));
        assert_eq!(Date::try_from_value(ts.as_value()).unwrap(), date);
        assert_eq!(Time::try_from_value(ts.as_value()).unwrap(), time);
        assert_eq!(
            PrimitiveDateTime::try_from_value(date.as_value()).unwrap(),
            PrimitiveDateTime::new(date, Time::MIDNIGHT)
        );
        assert!(Date::try_from_value(1_i32.as_value()).is_err());
    }

    #[test]
    fn value_option() {
        assert_eq!(None::<i32>.as_value(), Value::Int32(None));
        assert_eq!(Some(5_i32).as_value(), Value::Int32(Some(5)));
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int32(None)).unwrap(),
            None
        );
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int32(Some(5))).unwrap(),
            Some(5)
        );
    }

    #[test]
    fn value_list() {
        let val = vec![1_i32, 2, 3].as_value();
        assert_eq!(
            val,
            Value::List(
                Some(vec![
                    Value::Int32(Some(1)),
                    Value::Int32(Some(2)),
                    Value::Int32(Some(3)),
                ]),
                Box::new(Value::Int32(None)),
            )
        );
        assert_eq!(val.to_text().unwrap(), "{1,2,3}");
        assert_eq!(Vec::<i32>::try_from_value(val).unwrap(), vec![1, 2, 3]);
        assert!(Vec::<i32>::try_from_value("no".as_value()).is_err());
    }

    #[test]
    fn value_to_text() {
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::Varchar(None).to_text(), None);
        assert_eq!(Value::Boolean(Some(true)).to_text().unwrap(), "true");
        assert_eq!(Value::Int64(Some(-7)).to_text().unwrap(), "-7");
        assert_eq!(
            Value::Decimal(Some(Decimal::new(105, 1))).to_text().unwrap(),
            "10.5"
        );
    }
}
