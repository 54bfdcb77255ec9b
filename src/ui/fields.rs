/// Input fields of the add/edit form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Phone,
    Email,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Phone, FormField::Email];

    pub const COUNT: usize = 3;

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Phone => "Phone",
            FormField::Email => "Email",
        }
    }

    pub fn index(self) -> usize {
        match self {
            FormField::Name => 0,
            FormField::Phone => 1,
            FormField::Email => 2,
        }
    }

    /// Next field, wrapping from Email back to Name
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    /// Previous field, wrapping from Name to Email
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::COUNT - 1) % Self::COUNT]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_order_wraps() {
        assert_eq!(FormField::Name.next(), FormField::Phone);
        assert_eq!(FormField::Email.next(), FormField::Name);
        assert_eq!(FormField::Name.prev(), FormField::Email);
        for field in FormField::ALL {
            assert_eq!(FormField::ALL[field.index()], field);
        }
    }
}
