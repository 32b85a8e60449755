//! Canned compiler diagnostic output.

/// `g++ -E -xc++ - -v` stderr on a Debian-style host.
pub const GCC_CXX_STDERR: &str = "\
Using built-in specs.
COLLECT_GCC=g++
Target: x86_64-linux-gnu
ignoring nonexistent directory \"/usr/local/include/x86_64-linux-gnu\"
#include \"...\" search starts here:
#include <...> search starts here:
 /usr/include/c++/12
 /usr/include/x86_64-linux-gnu/c++/12
 /usr/lib/gcc/x86_64-linux-gnu/12/include
 /usr/local/include
 /usr/include
End of search list.
COMPILER_PATH=/usr/lib/gcc/x86_64-linux-gnu/12/
";

/// `gcc -E -xc - -v` stderr on the same host.
pub const GCC_C_STDERR: &str = "\
Using built-in specs.
#include \"...\" search starts here:
#include <...> search starts here:
 /usr/lib/gcc/x86_64-linux-gnu/12/include
 /usr/local/include
 /usr/include/x86_64-linux-gnu
 /usr/include
End of search list.
";

/// clang on macOS, with framework directories.
pub const CLANG_DARWIN_STDERR: &str = "\
Apple clang version 15.0.0 (clang-1500.1.0.2.5)
#include \"...\" search starts here:
#include <...> search starts here:
 /usr/local/include
 /Library/Developer/CommandLineTools/usr/lib/clang/15.0.0/include
 /Library/Developer/CommandLineTools/SDKs/MacOSX.sdk/usr/include
 /Library/Developer/CommandLineTools/SDKs/MacOSX.sdk/System/Library/Frameworks (framework directory)
End of search list.
";

/// Output of a compiler that does not report its search list.
pub const NO_MARKER_STDERR: &str = "\
Using built-in specs.
Thread model: posix
";
