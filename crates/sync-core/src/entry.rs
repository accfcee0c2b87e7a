//! Parsed directory entries.

/// One `type=value` component of a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    pub attribute: String,
    pub value: String,
}

impl Rdn {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Distinguished name: the raw string plus its RDN components, leaf first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    raw: String,
    rdns: Vec<Rdn>,
}

impl DistinguishedName {
    pub fn new(raw: impl Into<String>, rdns: Vec<Rdn>) -> Self {
        Self {
            raw: raw.into(),
            rdns,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Leaf RDN.
    pub fn first(&self) -> Option<&Rdn> {
        self.rdns.first()
    }
}

/// Directory entry: a DN and an ordered multimap of attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: DistinguishedName,
    attributes: Vec<(String, Vec<String>)>,
}

impl DirectoryEntry {
    pub fn new(dn: DistinguishedName) -> Self {
        Self {
            dn,
            attributes: Vec::new(),
        }
    }

    /// Append a value, grouping it with earlier values of the same attribute.
    pub fn push_value(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        let attribute = attribute.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, values)) => values.push(value),
            None => self.attributes.push((attribute, vec![value])),
        }
    }

    /// Builder-style variant of [`push_value`](Self::push_value).
    pub fn with_values<I, S>(mut self, attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.push_value(attribute, value);
        }
        self
    }

    /// Attributes in first-appearance order.
    pub fn attributes(&self) -> &[(String, Vec<String>)] {
        &self.attributes
    }

    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, values)| values.as_slice())
    }

    /// Case-insensitive attribute lookup, returning the stored name too.
    pub fn get_ignore_case(&self, attribute: &str) -> Option<(&str, &[String])> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}
