use mapforge::ValueResolver;

///
/// Decorate
///
/// Appends a caller-supplied suffix; the suffix surfaces on the generated
/// routine as `decorate_suffix`.
///

#[derive(Clone, Debug)]
pub struct Decorate {
    suffix: String,
}

impl Decorate {
    #[must_use]
    pub const fn new(suffix: String) -> Self {
        Self { suffix }
    }
}

impl ValueResolver<String, String> for Decorate {
    fn resolve(&self, source: &String) -> String {
        format!("{source}{}", self.suffix)
    }
}
