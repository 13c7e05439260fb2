///
/// AfterMap
///
/// Called by a generated routine once the destination is fully built, when
/// the after hook is enabled. The default body does nothing, so an empty
/// `impl AfterMap<Source> for Destination {}` opts a pair in.
///

pub trait AfterMap<S: ?Sized> {
    fn after_map(&mut self, _source: &S) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Source {
        first: String,
        last: String,
    }

    #[derive(Default)]
    struct Destination {
        first: String,
        full_name: String,
    }

    impl AfterMap<Source> for Destination {
        fn after_map(&mut self, source: &Source) {
            self.full_name = format!("{} {}", self.first, source.last);
        }
    }

    #[derive(Default)]
    struct Untouched(u32);

    impl AfterMap<Source> for Untouched {}

    #[test]
    fn hook_sees_the_built_destination() {
        let source = Source {
            first: "Ada".to_string(),
            last: "Lovelace".to_string(),
        };
        let mut destination = Destination {
            first: source.first.clone(),
            ..Default::default()
        };

        AfterMap::<Source>::after_map(&mut destination, &source);

        assert_eq!(destination.full_name, "Ada Lovelace");
    }

    #[test]
    fn default_hook_is_a_no_op() {
        let source = Source {
            first: String::new(),
            last: String::new(),
        };
        let mut destination = Untouched(7);

        destination.after_map(&source);

        assert_eq!(destination.0, 7);
    }
}
