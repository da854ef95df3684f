mod nexus_test;
use nexus_test::*;

nexus_test!(function_returns_value
"
function add(a, b):
{ return a + b
}
let result = add(3, 5)
"
  result == 8.0
);

nexus_test!(function_without_return_returns_nil
"
function noop():
{ 4 + 5
}
let result_is_nil = noop() == nil
"
  result_is_nil == true
);

nexus_test!(return_without_value_returns_nil
"
function bail():
{ return
}
let result_is_nil = bail() == nil
"
  result_is_nil == true
);

nexus_test!(function_does_not_execute_after_return
"
let touched = 0
function test():
{ return 9
  touched = 7
}
let result = test()
"
  touched == 0.0
  result == 9.0
);

nexus_test!(return_unwinds_nested_loops_and_blocks
"
function find():
{ for i = 0; i < 100; i = i + 1:
  { if i == 7:
    { return i
    }
  }
  return -1
}
let result = find()
"
  result == 7.0
);

nexus_test!(recursion
"
function fib(n):
{ if n < 2:
  { return n
  }
  return fib(n - 1) + fib(n - 2)
}
let result = fib(10)
"
  result == 55.0
);

nexus_test!(too_few_arguments_errors
"
function add(a, b):
{ return a + b
}
add(1)
"
  RuntimeError
);

nexus_test!(too_many_arguments_errors
"
function add(a, b):
{ return a + b
}
add(1, 2, 3)
"
  RuntimeError
);

nexus_test!(calling_a_number_errors
"
let f = 7
f()
"
  RuntimeError
);

nexus_test!(closures_capture_definition_environment
"
function make_counter():
{ let count = 0
  function increment():
  { count = count + 1
    return count
  }
  return increment
}
let counter = make_counter()
let a = counter()
let b = counter()
"
  a == 1.0
  b == 2.0
);

nexus_test!(two_closures_share_one_environment
"
function make():
{ let value = 0
  let get = lambda ():
  value
  let bump = lambda ():
  value = value + 1
  return [get, bump]
}
let pair = make()
pair[1]()
pair[1]()
let result = pair[0]()
"
  result == 2.0
);

nexus_test!(lambda_with_block_body
"
let double = lambda (x):
{ return x * 2
}
let result = double(21)
"
  result == 42.0
);

nexus_test!(lambda_with_expression_body
"
let increment = lambda (x):
x + 1
let result = increment(41)
"
  result == 42.0
);

nexus_test!(functions_are_first_class
"
function twice(f, x):
{ return f(f(x))
}
let result = twice(lambda (n):
n * 3, 2)
"
  result == 18.0
);

nexus_test!(functions_can_be_reassigned
"
function original():
{ return 1
}
let f = original
function replacement():
{ return 2
}
f = replacement
let result = f()
"
  result == 2.0
);

nexus_test!(function_type_is_function
"
function f():
{ return 1
}
let t = type(f)
let lambda_type = type(lambda ():
1)
"
  t == "function"
  lambda_type == "function"
);

nexus_test!(return_outside_function_errors
"
return 1
"
  RuntimeError
);

nexus_test!(parameters_shadow_globals
"
let x = 1
function probe(x):
{ return x
}
let result = probe(9)
"
  x == 1.0
  result == 9.0
);
