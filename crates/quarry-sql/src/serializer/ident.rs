use super::{Formatter, Params, ToSql};

pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let ident = self.0.as_ref();

        // Plain snake_case identifiers stay unquoted; anything else is
        // double-quoted.
        let plain = !ident.is_empty()
            && ident
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if plain {
            f.dst.push_str(ident);
        } else {
            f.dst.push('"');
            f.dst.push_str(&ident.replace('"', "\"\""));
            f.dst.push('"');
        }
    }
}
