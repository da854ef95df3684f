mod nexus_test;
use nexus_test::*;

nexus_test!(if_executes_then_branch
"
let result = 0
if 1 < 2:
{ result = 1
}
"
  result == 1.0
);

nexus_test!(if_skips_when_false
"
let result = 0
if 1 > 2:
{ result = 1
}
"
  result == 0.0
);

nexus_test!(if_else
"
let result = 0
if 1 > 2:
{ result = 1
} else:
{ result = 2
}
"
  result == 2.0
);

nexus_test!(truthiness_rules
"
let from_nil = nil ? 1 : 0
let from_false = false ? 1 : 0
let from_zero = 0 ? 1 : 0
let from_empty_string = \"\" ? 1 : 0
let from_empty_list = [] ? 1 : 0
let from_number = 7 ? 1 : 0
let from_string = \"x\" ? 1 : 0
"
  from_nil == 0.0
  from_false == 0.0
  from_zero == 0.0
  from_empty_string == 0.0
  from_empty_list == 1.0
  from_number == 1.0
  from_string == 1.0
);

nexus_test!(while_loop
"
let i = 0
let total = 0
while i < 5:
{ i = i + 1
  total = total + i
}
"
  i == 5.0
  total == 15.0
);

nexus_test!(for_loop
"
let acc = 0
for i = 1; i <= 5; i = i + 1:
{ acc = acc + i
}
"
  acc == 15.0
);

nexus_test!(for_loop_variable_is_scoped
"
for i = 0; i < 3; i = i + 1:
{ i
}
let crash = i
"
  RuntimeError
);

nexus_test!(for_loop_without_condition_breaks
"
let count = 0
for i = 0; ; i = i + 1:
{ count = count + 1
  if count >= 3:
  { break
  }
}
"
  count == 3.0
);

nexus_test!(break_leaves_while_loop
"
let i = 0
while true:
{ i = i + 1
  if i == 4:
  { break
  }
}
"
  i == 4.0
);

nexus_test!(continue_skips_rest_of_body
"
let total = 0
for i = 1; i <= 5; i = i + 1:
{ if i == 3:
  { continue
  }
  total = total + i
}
"
  total == 12.0
);

nexus_test!(continue_in_while_rechecks_condition
"
let i = 0
let odd_total = 0
while i < 6:
{ i = i + 1
  if i % 2 == 0:
  { continue
  }
  odd_total = odd_total + i
}
"
  odd_total == 9.0
);

nexus_test!(break_outside_loop_errors
"
break
"
  RuntimeError
);

nexus_test!(continue_outside_loop_errors
"
continue
"
  RuntimeError
);

nexus_test!(break_escapes_nested_blocks
"
let i = 0
while i < 10:
{ i = i + 1
  { { break
    }
  }
}
"
  i == 1.0
);

nexus_test!(switch_runs_first_matching_case
"
let x = 2
let result = 0
switch x:
{ case 1:
  { result = 10
  }
  case 2:
  { result = 20
  }
  case 3:
  { result = 30
  }
}
"
  result == 20.0
);

nexus_test!(switch_has_no_fallthrough
"
let hits = 0
switch 1:
{ case 1:
  { hits = hits + 1
  }
  case 1:
  { hits = hits + 1
  }
}
"
  hits == 1.0
);

nexus_test!(switch_default
"
let result = 0
switch 99:
{ case 1:
  { result = 10
  }
  default:
  { result = -1
  }
}
"
  result == -1.0
);

nexus_test!(switch_on_strings
"
let result = \"\"
switch \"b\":
{ case \"a\":
  { result = \"first\"
  }
  case \"b\":
  { result = \"second\"
  }
}
"
  result == "second"
);

nexus_test!(switch_without_match_or_default_does_nothing
"
let result = 1
switch 42:
{ case 1:
  { result = 2
  }
}
"
  result == 1.0
);
