//! OpenAPI path template matching
//!
//! Templates use OpenAPI syntax: a segment written as `{name}` binds the
//! corresponding request segment to `name`, every other segment must match
//! literally. Matching is first-match-wins over the template order.

use indexmap::IndexMap;

/// Path parameters extracted from a request, in template order
pub type PathParams = IndexMap<String, String>;

/// A single `/`-delimited template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw.len() >= 2 && raw.starts_with('{') && raw.ends_with('}') {
            Segment::Param(raw[1..raw.len() - 1].to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }
}

/// A compiled path template
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a template such as `/users/{id}/posts`
    pub fn parse(template: &str) -> Self {
        let segments = normalize(template)
            .split('/')
            .map(Segment::parse)
            .collect();

        Self {
            raw: template.to_string(),
            segments,
        }
    }

    /// The template exactly as declared in the spec document
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the parameter segments, in order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a request path against the whole template.
    ///
    /// Returns the captured parameters when every segment matches and the
    /// segment counts are equal.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let path = normalize(path);
        let parts: Vec<&str> = path.split('/').collect();

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        Some(params)
    }
}

/// A successful match: the selected template and its bound parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch<'a> {
    pub template: &'a str,
    pub params: PathParams,
}

/// Templates compiled once and matched in declaration order
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    templates: Vec<PathTemplate>,
}

impl PathMatcher {
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            templates: templates
                .into_iter()
                .map(|t| PathTemplate::parse(t.as_ref()))
                .collect(),
        }
    }

    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }

    /// Return the first template that matches `path`
    pub fn find(&self, path: &str) -> Option<PathMatch<'_>> {
        self.templates.iter().find_map(|template| {
            template.matches(path).map(|params| PathMatch {
                template: template.as_str(),
                params,
            })
        })
    }
}

/// Match `path` against `templates` in order without keeping the compiled form
pub fn match_path<'a, I>(path: &str, templates: I) -> Option<PathMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    templates.into_iter().find_map(|template| {
        PathTemplate::parse(template)
            .matches(path)
            .map(|params| PathMatch { template, params })
    })
}

/// Strip one trailing slash. The root path stays `/`.
fn normalize(path: &str) -> &str {
    let stripped = path.strip_suffix('/').unwrap_or(path);
    if stripped.is_empty() {
        "/"
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> PathParams {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_exact_path() {
        let m = match_path("/test", ["/test"]).unwrap();
        assert_eq!(m.template, "/test");
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_trailing_slash_on_request() {
        let m = match_path("/test/", ["/test"]).unwrap();
        assert_eq!(m.template, "/test");
    }

    #[test]
    fn test_trailing_slash_on_template() {
        let m = match_path("/test", ["/test/"]).unwrap();
        assert_eq!(m.template, "/test/");
    }

    #[test]
    fn test_single_parameter() {
        let m = match_path("/test/123", ["/test/{id}"]).unwrap();
        assert_eq!(m.template, "/test/{id}");
        assert_eq!(m.params, params(&[("id", "123")]));
    }

    #[test]
    fn test_multiple_parameters_keep_template_order() {
        let m = match_path("/test/123/action", ["/test/{id}/{action}"]).unwrap();
        let keys: Vec<&str> = m.params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "action"]);
        assert_eq!(m.params, params(&[("id", "123"), ("action", "action")]));
    }

    #[test]
    fn test_nested_parameters() {
        let m = match_path("/test/123/nested/456", ["/test/{id}/nested/{nestedId}"]).unwrap();
        assert_eq!(m.params, params(&[("id", "123"), ("nestedId", "456")]));
    }

    #[test]
    fn test_no_match() {
        assert!(match_path("/non-matching", ["/test"]).is_none());
    }

    #[test]
    fn test_empty_template_list() {
        assert!(match_path("/test", std::iter::empty()).is_none());
    }

    #[test]
    fn test_segment_count_must_agree() {
        assert!(match_path("/test/1/2", ["/test/{id}"]).is_none());
        assert!(match_path("/test", ["/test/{id}"]).is_none());
    }

    #[test]
    fn test_literal_then_param_template() {
        let m = match_path("/a/1", ["/a", "/a/{id}"]).unwrap();
        assert_eq!(m.template, "/a/{id}");
        assert_eq!(m.params, params(&[("id", "1")]));
    }

    #[test]
    fn test_first_listed_template_wins() {
        let m = match_path("/x/y", ["/x/{id}", "/x/y"]).unwrap();
        assert_eq!(m.template, "/x/{id}");
        assert_eq!(m.params, params(&[("id", "y")]));

        let m = match_path("/x/y", ["/x/y", "/x/{id}"]).unwrap();
        assert_eq!(m.template, "/x/y");
        assert!(m.params.is_empty());
    }

    #[test]
    fn test_empty_segment_does_not_bind() {
        assert!(match_path("/test//x", ["/test/{id}/x"]).is_none());
    }

    #[test]
    fn test_root_path() {
        let m = match_path("/", ["/"]).unwrap();
        assert_eq!(m.template, "/");
        assert!(match_path("/a", ["/"]).is_none());
    }

    #[test]
    fn test_trailing_slash_invariance() {
        let templates = ["/", "/users", "/users/{id}", "/users/{id}/posts/{postId}"];
        for path in ["/", "/users", "/users/42", "/users/42/posts/7", "/nothing"] {
            let with_slash = format!("{}/", path);
            assert_eq!(
                match_path(path, templates),
                match_path(&with_slash, templates),
                "path {}",
                path
            );
        }
    }

    #[test]
    fn test_substituted_values_round_trip() {
        let template = "/orgs/{org}/repos/{repo}/issues/{number}";
        let values = [("org", "rust-lang"), ("repo", "cargo"), ("number", "12345")];
        let concrete = values.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{}}}", name), value)
        });

        let m = match_path(&concrete, [template]).unwrap();
        assert_eq!(m.template, template);
        assert_eq!(m.params, params(&values));
    }

    #[test]
    fn test_matcher_compiles_once() {
        let matcher = PathMatcher::new(["/pets", "/pets/{petId}"]);
        assert_eq!(matcher.templates().len(), 2);

        let m = matcher.find("/pets/9").unwrap();
        assert_eq!(m.template, "/pets/{petId}");
        assert_eq!(m.params.get("petId").map(String::as_str), Some("9"));
        assert!(matcher.find("/owners").is_none());
    }

    #[test]
    fn test_param_names() {
        let template = PathTemplate::parse("/a/{b}/c/{d}");
        assert_eq!(template.param_names().collect::<Vec<_>>(), vec!["b", "d"]);
        assert_eq!(template.segments()[1], Segment::Literal("a".to_string()));
    }
}
