use std::collections::HashMap;

/// What the generator knows about a declared variable: its slot offset below
/// `rbp` and the declared type name (`int`, `bool`, `string`).
#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub offset: usize,
    pub ty: String,
}

/// LIFO stack of name-to-slot mappings. A scope is pushed at `_start` and at
/// every procedure entry; block statements do not push scopes, so their
/// declarations live in the enclosing frame.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, VariableInfo>>,
}

impl ScopeStack {
    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Whether `name` is declared in the innermost scope. Outer scopes are
    /// ignored here; redeclaration is only an error within one scope.
    pub fn declared_in_innermost(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// Registers `name` in the innermost scope.
    pub fn declare(&mut self, name: String, info: VariableInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, info);
        }
    }

    /// Resolves `name` by walking scopes from innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<&VariableInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let mut scopes = ScopeStack::default();
        scopes.push();
        scopes.declare(
            "x".to_owned(),
            VariableInfo {
                offset: 8,
                ty: "int".to_owned(),
            },
        );
        scopes.push();
        scopes.declare(
            "y".to_owned(),
            VariableInfo {
                offset: 16,
                ty: "bool".to_owned(),
            },
        );

        assert_eq!(scopes.lookup("x").map(|info| info.offset), Some(8));
        assert_eq!(scopes.lookup("y").map(|info| info.offset), Some(16));
        assert!(!scopes.declared_in_innermost("x"));
        assert!(scopes.declared_in_innermost("y"));

        scopes.pop();
        assert!(scopes.lookup("y").is_none());
        assert!(scopes.declared_in_innermost("x"));
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let mut scopes = ScopeStack::default();
        scopes.push();
        scopes.declare(
            "n".to_owned(),
            VariableInfo {
                offset: 8,
                ty: "int".to_owned(),
            },
        );
        scopes.push();
        scopes.declare(
            "n".to_owned(),
            VariableInfo {
                offset: 24,
                ty: "int".to_owned(),
            },
        );

        assert_eq!(scopes.lookup("n").map(|info| info.offset), Some(24));
    }
}
