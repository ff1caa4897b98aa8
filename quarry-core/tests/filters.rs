#[cfg(test)]
mod tests {
    use quarry_core::{
        Filter, FilterContext, UnknownFilterError, Value, apply_filter, apply_filters,
    };

    struct Account;

    impl FilterContext for Account {
        fn call_filter(&self, name: &str, value: &Value) -> Option<Value> {
            match name {
                "obfuscate" => Some(Value::Text(format!("<{:?}>", value))),
                _ => None,
            }
        }
    }

    #[test]
    fn builtin_trim() {
        let value = apply_filters(&Value::Text("  Hi  ".into()), &[Filter::named("trim")], &())
            .expect("trim should resolve");
        assert_eq!(value, Value::Text("Hi".into()));
    }

    #[test]
    fn builtin_ltrim_rtrim() {
        let value = apply_filter(&Value::Text("  Hi  ".into()), &Filter::named("ltrim"), &())
            .expect("ltrim should resolve");
        assert_eq!(value, Value::Text("Hi  ".into()));
        let value = apply_filter(&Value::Text("  Hi  ".into()), &Filter::named("rtrim"), &())
            .expect("rtrim should resolve");
        assert_eq!(value, Value::Text("  Hi".into()));
    }

    #[test]
    fn builtin_case() {
        let value = apply_filters(&Value::Text("Hi".into()), &[Filter::named("uppercase")], &())
            .expect("uppercase should resolve");
        assert_eq!(value, Value::Text("HI".into()));
        let value = apply_filters(&Value::Text("Hi".into()), &[Filter::named("lowercase")], &())
            .expect("lowercase should resolve");
        assert_eq!(value, Value::Text("hi".into()));
    }

    #[test]
    fn non_text_values_coerce_to_text() {
        let value = apply_filters(&Value::Integer(5), &[Filter::named("uppercase")], &())
            .expect("uppercase should resolve");
        assert_eq!(value, Value::Text("5".into()));
        let value = apply_filters(&Value::Boolean(true), &[Filter::named("uppercase")], &())
            .expect("uppercase should resolve");
        assert_eq!(value, Value::Text("TRUE".into()));
    }

    #[test]
    fn chain_threads_left_to_right() {
        let filters = [Filter::named("trim"), Filter::named("uppercase")];
        let value = apply_filters(&Value::Text("  hi there  ".into()), &filters, &())
            .expect("chain should resolve");
        assert_eq!(value, Value::Text("HI THERE".into()));
    }

    #[test]
    fn empty_chain_is_identity() {
        let value = apply_filters(&Value::Integer(7), &[], &()).expect("empty chain");
        assert_eq!(value, Value::Integer(7));
    }

    #[test]
    fn unknown_name_fails() {
        let error = apply_filters(&Value::Text("x".into()), &[Filter::named("frobnicate")], &())
            .expect_err("unresolvable filter must fail");
        let unknown = error
            .downcast_ref::<UnknownFilterError>()
            .expect("the failure should identify the filter");
        assert_eq!(unknown.0, "frobnicate");
    }

    #[test]
    fn pattern_removes_every_match() {
        let filter = Filter::pattern("[aeiou]").expect("pattern should compile");
        let value = apply_filter(&Value::Text("banana".into()), &filter, &())
            .expect("pattern should resolve");
        assert_eq!(value, Value::Text("bnn".into()));
    }

    #[test]
    fn replace_first_occurrence() {
        let filter = Filter::replace("a", "o", "").expect("replace should compile");
        let value = apply_filter(&Value::Text("banana".into()), &filter, &())
            .expect("replace should resolve");
        assert_eq!(value, Value::Text("bonana".into()));
    }

    #[test]
    fn replace_global_flag() {
        let filter = Filter::replace("a", "o", "g").expect("replace should compile");
        let value = apply_filter(&Value::Text("banana".into()), &filter, &())
            .expect("replace should resolve");
        assert_eq!(value, Value::Text("bonono".into()));
    }

    #[test]
    fn replace_case_insensitive_flag() {
        let filter = Filter::replace("BAN", "", "i").expect("replace should compile");
        let value = apply_filter(&Value::Text("banana".into()), &filter, &())
            .expect("replace should resolve");
        assert_eq!(value, Value::Text("ana".into()));
    }

    #[test]
    fn custom_callable_gets_the_text_form() {
        let filter = Filter::custom(|_, text| Value::Text(format!("{}!", text)));
        let value =
            apply_filter(&Value::Integer(3), &filter, &()).expect("custom should resolve");
        assert_eq!(value, Value::Text("3!".into()));
    }

    #[test]
    fn context_capability_gets_the_original_value() {
        let value = apply_filters(&Value::Integer(5), &[Filter::named("obfuscate")], &Account)
            .expect("capability should resolve");
        assert_eq!(value, Value::Text("<Integer(5)>".into()));
    }

    #[test]
    fn capability_miss_still_fails() {
        let error = apply_filters(&Value::Integer(5), &[Filter::named("redact")], &Account)
            .expect_err("missing capability must fail");
        assert!(error.downcast_ref::<UnknownFilterError>().is_some());
    }
}
