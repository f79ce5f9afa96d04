//! Utility functions for the container
//!
//! Naming conventions for default bean names, and the bookkeeping used to
//! detect dependency cycles both at creation time and ahead of it.

/// Naming convention utilities for bean names
pub mod naming {
    /// Converts a PascalCase type name to camelCase for bean naming.
    ///
    /// This is the default bean naming strategy: `UserService` becomes
    /// `userService`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprig_core::utils::naming::to_camel_case;
    ///
    /// assert_eq!(to_camel_case("UserService"), "userService");
    /// assert_eq!(to_camel_case("DatabaseConnectionPool"), "databaseConnectionPool");
    /// assert_eq!(to_camel_case("A"), "a");
    /// assert_eq!(to_camel_case(""), "");
    /// ```
    pub fn to_camel_case(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = String::with_capacity(s.len());
                result.extend(first.to_lowercase());
                result.push_str(chars.as_str());
                result
            }
        }
    }

    /// Strips the module path and generic arguments from a type name.
    ///
    /// ```
    /// use sprig_core::utils::naming::short_type_name;
    ///
    /// assert_eq!(short_type_name("app::service::UserService"), "UserService");
    /// assert_eq!(short_type_name("app::Cache<alloc::string::String>"), "Cache");
    /// ```
    pub fn short_type_name(type_name: &str) -> &str {
        let without_generics = type_name
            .split_once('<')
            .map_or(type_name, |(head, _)| head);
        without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics)
    }

    /// Default bean name for a Rust type: its short name in camelCase.
    pub fn default_bean_name<T: ?Sized>() -> String {
        to_camel_case(short_type_name(std::any::type_name::<T>()))
    }
}

/// Dependency resolution utilities
pub mod dependency {
    use indexmap::IndexMap;
    use std::collections::HashSet;

    /// The chain of beans being created by one top-level request.
    ///
    /// Each `get_bean` call owns its own stack, so two threads creating
    /// the same prototype concurrently never see each other as a cycle.
    #[derive(Debug, Default, Clone)]
    pub struct CreationStack {
        chain: Vec<String>,
    }

    impl CreationStack {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pushes `name` onto the chain.
        ///
        /// Returns the full cycle (ending with `name` again) if `name` is
        /// already being created further up the chain.
        pub fn enter(&mut self, name: &str) -> Result<(), Vec<String>> {
            if let Some(start) = self.chain.iter().position(|n| n == name) {
                let mut cycle = self.chain[start..].to_vec();
                cycle.push(name.to_string());
                return Err(cycle);
            }
            self.chain.push(name.to_string());
            Ok(())
        }

        /// Pops `name` off the chain.
        pub fn leave(&mut self, name: &str) {
            debug_assert_eq!(self.chain.last().map(String::as_str), Some(name));
            self.chain.pop();
        }

        pub fn is_creating(&self, name: &str) -> bool {
            self.chain.iter().any(|n| n == name)
        }

        pub fn depth(&self) -> usize {
            self.chain.len()
        }

        pub fn chain(&self) -> &[String] {
            &self.chain
        }
    }

    /// Dependency graph analysis result
    #[derive(Debug, PartialEq, Eq)]
    pub enum DependencyValidationError {
        /// Circular dependency detected
        CircularDependency {
            /// The dependency chain forming the cycle
            cycle: Vec<String>,
        },
        /// Missing dependency detected
        MissingDependency {
            /// The bean that requires the dependency
            bean: String,
            /// The missing dependency
            missing: String,
        },
    }

    impl std::fmt::Display for DependencyValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::CircularDependency { cycle } => {
                    write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
                }
                Self::MissingDependency { bean, missing } => {
                    write!(f, "Bean '{}' depends on '{}' which is not registered", bean, missing)
                }
            }
        }
    }

    /// Validates a dependency graph for cycles and missing beans.
    ///
    /// `dependencies` maps each bean name to the names it injects, in
    /// declaration order. The first problem found is returned; traversal
    /// follows the map's order, so the result is deterministic.
    pub fn validate_dependency_graph(
        dependencies: &IndexMap<String, Vec<String>>,
    ) -> Result<(), DependencyValidationError> {
        for (bean_name, deps) in dependencies {
            for dep in deps {
                if !dependencies.contains_key(dep) {
                    return Err(DependencyValidationError::MissingDependency {
                        bean: bean_name.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        let mut visited = HashSet::new();
        let mut rec_stack = Vec::new();

        for bean_name in dependencies.keys() {
            if !visited.contains(bean_name.as_str()) {
                if let Some(cycle) =
                    detect_cycle_dfs(bean_name, dependencies, &mut visited, &mut rec_stack)
                {
                    return Err(DependencyValidationError::CircularDependency { cycle });
                }
            }
        }

        Ok(())
    }

    fn detect_cycle_dfs(
        node: &str,
        graph: &IndexMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        rec_stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node.to_string());
        rec_stack.push(node.to_string());

        if let Some(deps) = graph.get(node) {
            for dep in deps {
                if let Some(start_idx) = rec_stack.iter().position(|x| x == dep) {
                    let mut cycle = rec_stack[start_idx..].to_vec();
                    cycle.push(dep.to_string());
                    return Some(cycle);
                }
                if !visited.contains(dep.as_str()) {
                    if let Some(cycle) = detect_cycle_dfs(dep, graph, visited, rec_stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        rec_stack.pop();
        None
    }
}
