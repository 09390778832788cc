//! Well-known types of the .NET core library.
//!
//! Core types bind like any other name but are never part of the analyzed source, so the
//! reference collector always treats them as external.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreType {
    pub namespace: &'static str,
    pub name: &'static str,
    /// C# keyword alias such as `int` for `System.Int32`
    pub keyword: Option<&'static str>,
}

impl CoreType {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// (namespace, name, accepted arities; empty accepts any)
type Entry = (&'static str, &'static str, &'static [usize]);

const NON_GENERIC: &[usize] = &[0];
const ONE: &[usize] = &[1];
const TWO: &[usize] = &[2];
const ANY: &[usize] = &[];

const KEYWORDS: &[(&str, &str)] = &[
    ("object", "Object"),
    ("string", "String"),
    ("bool", "Boolean"),
    ("byte", "Byte"),
    ("sbyte", "SByte"),
    ("char", "Char"),
    ("decimal", "Decimal"),
    ("double", "Double"),
    ("float", "Single"),
    ("short", "Int16"),
    ("ushort", "UInt16"),
    ("int", "Int32"),
    ("uint", "UInt32"),
    ("long", "Int64"),
    ("ulong", "UInt64"),
    ("nint", "IntPtr"),
    ("nuint", "UIntPtr"),
    ("void", "Void"),
];

const TYPES: &[Entry] = &[
    ("System", "DateTime", NON_GENERIC),
    ("System", "DateTimeOffset", NON_GENERIC),
    ("System", "DateOnly", NON_GENERIC),
    ("System", "TimeOnly", NON_GENERIC),
    ("System", "TimeSpan", NON_GENERIC),
    ("System", "Guid", NON_GENERIC),
    ("System", "Uri", NON_GENERIC),
    ("System", "Type", NON_GENERIC),
    ("System", "Enum", NON_GENERIC),
    ("System", "Array", NON_GENERIC),
    ("System", "Attribute", NON_GENERIC),
    ("System", "Delegate", NON_GENERIC),
    ("System", "EventArgs", NON_GENERIC),
    ("System", "EventHandler", &[0, 1]),
    ("System", "Math", NON_GENERIC),
    ("System", "Convert", NON_GENERIC),
    ("System", "Console", NON_GENERIC),
    ("System", "Environment", NON_GENERIC),
    ("System", "Random", NON_GENERIC),
    ("System", "Nullable", ONE),
    ("System", "Lazy", ONE),
    ("System", "Func", ANY),
    ("System", "Action", ANY),
    ("System", "Tuple", ANY),
    ("System", "ValueTuple", ANY),
    ("System", "Span", ONE),
    ("System", "ReadOnlySpan", ONE),
    ("System", "Memory", ONE),
    ("System", "ReadOnlyMemory", ONE),
    ("System", "IDisposable", NON_GENERIC),
    ("System", "IAsyncDisposable", NON_GENERIC),
    ("System", "ICloneable", NON_GENERIC),
    ("System", "IComparable", &[0, 1]),
    ("System", "IEquatable", ONE),
    ("System", "IFormattable", NON_GENERIC),
    ("System", "IServiceProvider", NON_GENERIC),
    ("System", "Exception", NON_GENERIC),
    ("System", "SystemException", NON_GENERIC),
    ("System", "ArgumentException", NON_GENERIC),
    ("System", "ArgumentNullException", NON_GENERIC),
    ("System", "ArgumentOutOfRangeException", NON_GENERIC),
    ("System", "InvalidOperationException", NON_GENERIC),
    ("System", "InvalidCastException", NON_GENERIC),
    ("System", "NotImplementedException", NON_GENERIC),
    ("System", "NotSupportedException", NON_GENERIC),
    ("System", "NullReferenceException", NON_GENERIC),
    ("System", "IndexOutOfRangeException", NON_GENERIC),
    ("System", "FormatException", NON_GENERIC),
    ("System", "OverflowException", NON_GENERIC),
    ("System", "DivideByZeroException", NON_GENERIC),
    ("System", "ObjectDisposedException", NON_GENERIC),
    ("System", "OperationCanceledException", NON_GENERIC),
    ("System", "TimeoutException", NON_GENERIC),
    ("System", "UnauthorizedAccessException", NON_GENERIC),
    ("System.Collections", "IEnumerable", NON_GENERIC),
    ("System.Collections", "IEnumerator", NON_GENERIC),
    ("System.Collections", "ICollection", NON_GENERIC),
    ("System.Collections", "IList", NON_GENERIC),
    ("System.Collections", "IDictionary", NON_GENERIC),
    ("System.Collections", "ArrayList", NON_GENERIC),
    ("System.Collections", "Hashtable", NON_GENERIC),
    ("System.Collections.Generic", "List", ONE),
    ("System.Collections.Generic", "Dictionary", TWO),
    ("System.Collections.Generic", "HashSet", ONE),
    ("System.Collections.Generic", "SortedSet", ONE),
    ("System.Collections.Generic", "SortedDictionary", TWO),
    ("System.Collections.Generic", "SortedList", TWO),
    ("System.Collections.Generic", "Queue", ONE),
    ("System.Collections.Generic", "Stack", ONE),
    ("System.Collections.Generic", "LinkedList", ONE),
    ("System.Collections.Generic", "KeyValuePair", TWO),
    ("System.Collections.Generic", "IEnumerable", ONE),
    ("System.Collections.Generic", "IEnumerator", ONE),
    ("System.Collections.Generic", "IAsyncEnumerable", ONE),
    ("System.Collections.Generic", "ICollection", ONE),
    ("System.Collections.Generic", "IList", ONE),
    ("System.Collections.Generic", "ISet", ONE),
    ("System.Collections.Generic", "IDictionary", TWO),
    ("System.Collections.Generic", "IReadOnlyCollection", ONE),
    ("System.Collections.Generic", "IReadOnlyList", ONE),
    ("System.Collections.Generic", "IReadOnlyDictionary", TWO),
    ("System.Collections.Generic", "IComparer", ONE),
    ("System.Collections.Generic", "IEqualityComparer", ONE),
    ("System.Collections.Generic", "KeyNotFoundException", NON_GENERIC),
    ("System.Threading", "CancellationToken", NON_GENERIC),
    ("System.Threading", "CancellationTokenSource", NON_GENERIC),
    ("System.Threading", "SemaphoreSlim", NON_GENERIC),
    ("System.Threading", "Thread", NON_GENERIC),
    ("System.Threading", "Interlocked", NON_GENERIC),
    ("System.Threading", "Monitor", NON_GENERIC),
    ("System.Threading.Tasks", "Task", &[0, 1]),
    ("System.Threading.Tasks", "ValueTask", &[0, 1]),
    ("System.Threading.Tasks", "TaskCompletionSource", &[0, 1]),
    ("System.Threading.Tasks", "Parallel", NON_GENERIC),
    ("System.Linq", "Enumerable", NON_GENERIC),
    ("System.Linq", "Queryable", NON_GENERIC),
    ("System.Linq", "IQueryable", &[0, 1]),
    ("System.Linq", "IOrderedEnumerable", ONE),
    ("System.Linq", "IGrouping", TWO),
    ("System.Linq", "ILookup", TWO),
    ("System.IO", "Stream", NON_GENERIC),
    ("System.IO", "MemoryStream", NON_GENERIC),
    ("System.IO", "FileStream", NON_GENERIC),
    ("System.IO", "File", NON_GENERIC),
    ("System.IO", "FileInfo", NON_GENERIC),
    ("System.IO", "Directory", NON_GENERIC),
    ("System.IO", "DirectoryInfo", NON_GENERIC),
    ("System.IO", "Path", NON_GENERIC),
    ("System.IO", "TextReader", NON_GENERIC),
    ("System.IO", "TextWriter", NON_GENERIC),
    ("System.IO", "StreamReader", NON_GENERIC),
    ("System.IO", "StreamWriter", NON_GENERIC),
    ("System.IO", "StringReader", NON_GENERIC),
    ("System.IO", "StringWriter", NON_GENERIC),
    ("System.IO", "IOException", NON_GENERIC),
    ("System.IO", "FileNotFoundException", NON_GENERIC),
    ("System.IO", "DirectoryNotFoundException", NON_GENERIC),
    ("System.Text", "StringBuilder", NON_GENERIC),
    ("System.Text", "Encoding", NON_GENERIC),
];

/// Entries keyed by `namespace.name`
static BY_NAME: Lazy<HashMap<String, Vec<Entry>>> = Lazy::new(|| {
    let mut map: HashMap<String, Vec<Entry>> = HashMap::new();
    let keyword_types = KEYWORDS
        .iter()
        .map(|(_, name)| ("System", *name, NON_GENERIC));
    for (namespace, name, arities) in keyword_types.chain(TYPES.iter().copied()) {
        map.entry(format!("{namespace}.{name}"))
            .or_default()
            .push((namespace, name, arities));
    }
    map
});

fn keyword_of(namespace: &str, name: &str) -> Option<&'static str> {
    if namespace != "System" {
        return None;
    }
    KEYWORDS
        .iter()
        .find(|(_, type_name)| *type_name == name)
        .map(|(keyword, _)| *keyword)
}

/// Core type `namespace.name` with the given number of type arguments
pub fn lookup(namespace: &str, name: &str, arity: usize) -> Option<CoreType> {
    BY_NAME
        .get(&format!("{namespace}.{name}"))?
        .iter()
        .find(|(_, _, arities)| arities.is_empty() || arities.contains(&arity))
        .map(|&(namespace, name, _)| CoreType {
            namespace,
            name,
            keyword: if arity == 0 {
                keyword_of(namespace, name)
            } else {
                None
            },
        })
}

/// Core type written fully qualified, e.g. `System.Collections.Generic.List`
pub fn lookup_qualified(qualified: &str, arity: usize) -> Option<CoreType> {
    let (namespace, name) = qualified.rsplit_once('.')?;
    lookup(namespace, name, arity)
}

/// Core type behind a predefined keyword such as `int` or `string`
pub fn predefined(keyword: &str) -> Option<CoreType> {
    KEYWORDS
        .iter()
        .find(|(kw, _)| *kw == keyword)
        .map(|&(kw, name)| CoreType {
            namespace: "System",
            name,
            keyword: Some(kw),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_by_namespace_and_arity() {
        let list = lookup("System.Collections.Generic", "List", 1).unwrap();
        assert_eq!(list.full_name(), "System.Collections.Generic.List");
        assert!(lookup("System.Collections.Generic", "List", 0).is_none());
        assert!(lookup("System", "List", 1).is_none());
        assert!(lookup("System", "Func", 3).is_some());
    }

    #[test]
    fn keywords_round_trip() {
        let int = predefined("int").unwrap();
        assert_eq!(int.full_name(), "System.Int32");
        assert_eq!(lookup("System", "Int32", 0).unwrap().keyword, Some("int"));
        assert_eq!(lookup_qualified("System.String", 0).unwrap().keyword, Some("string"));
        assert!(predefined("var").is_none());
    }

    #[test]
    fn same_name_in_two_namespaces_is_distinct() {
        assert!(lookup("System.Collections", "IEnumerable", 0).is_some());
        assert!(lookup("System.Collections", "IEnumerable", 1).is_none());
        assert!(lookup("System.Collections.Generic", "IEnumerable", 1).is_some());
    }
}
