use std::{borrow::Borrow, collections::HashMap, ffi::OsStr, hash::Hash};

pub type Result<T> = std::result::Result<T, InterpError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined placeholder '#{{{0}}}' at column {1}")]
    UndefinedVar(String, usize),

    #[error("Unclosed placeholder (opened at column {0})")]
    UnclosedBrace(usize),
}

/// Expands `#{name}` placeholders in `fmt`.
/// `##` is an escaped `#`. Columns in errors are 1-based and count chars.
pub fn interp<K, V>(fmt: &str, variables: &HashMap<K, V>) -> Result<String>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    let mut res = String::with_capacity(fmt.len() * 2);
    let mut chars = fmt.chars().enumerate().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '#' {
            res.push(c);
            continue;
        }
        match chars.peek() {
            Some(&(_, '#')) => {
                chars.next();
                res.push('#');
            }
            Some(&(_, '{')) => {
                chars.next();
                let column = i + 1;
                let mut name = String::with_capacity(16);
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(InterpError::UnclosedBrace(column)),
                    }
                }
                let Some(value) = variables.get(name.as_str()) else {
                    return Err(InterpError::UndefinedVar(name, column));
                };
                res += value.as_ref().to_string_lossy().as_ref();
            }
            _ => res.push('#'),
        }
    }

    res.shrink_to_fit();
    Ok(res)
}

/// Expands every token of an argument vector.
pub fn interp_args<S, K, V>(tokens: &[S], variables: &HashMap<K, V>) -> Result<Vec<String>>
where
    S: AsRef<str>,
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    tokens
        .iter()
        .map(|token| self::interp(token.as_ref(), variables))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn interp_ok() {
        let vars = hashmap! {
            "source" => "/work/main.cpp",
            "exe" => "/tmp/acsb-x/main",
            "sourceStem" => "main",
            "_#%!?" => "wooo",
        };

        assert_eq!(interp("g++", &vars).unwrap(), "g++");
        assert_eq!(interp("#{source}", &vars).unwrap(), vars["source"]);
        assert_eq!(interp("#{_#%!?}", &vars).unwrap(), vars["_#%!?"]);
        assert_eq!(
            interp("-o#{exe}", &vars).unwrap(),
            format!("-o{}", vars["exe"])
        );
        assert_eq!(
            interp("#{sourceStem}.class", &vars).unwrap(),
            "main.class"
        );
        assert_eq!(interp("{source}", &vars).unwrap(), "{source}");
        assert_eq!(interp("# {source}", &vars).unwrap(), "# {source}");
        assert_eq!(interp("##{source}", &vars).unwrap(), "#{source}");
        assert_eq!(interp("#", &vars).unwrap(), "#");
        assert_eq!(interp("##", &vars).unwrap(), "#");
        assert_eq!(interp("###", &vars).unwrap(), "##");
    }

    #[test]
    fn interp_ng() {
        let vars = hashmap! { "source" => "main.py" };
        assert_eq!(
            interp("python3 #{exe}", &vars).unwrap_err(),
            InterpError::UndefinedVar("exe".to_owned(), 9)
        );
        assert_eq!(
            interp("#{source} #{exe", &vars).unwrap_err(),
            InterpError::UnclosedBrace(11)
        );
    }

    #[test]
    fn interp_args_expands_each_token() {
        let vars = hashmap! { "source" => "a.c", "exe" => "a.out" };
        let tokens = ["gcc", "#{source}", "-o", "#{exe}"];
        assert_eq!(
            interp_args(&tokens, &vars).unwrap(),
            vec!["gcc", "a.c", "-o", "a.out"]
        );
        assert!(interp_args(&["#{nope}"], &vars).is_err());
    }
}
