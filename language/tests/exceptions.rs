mod nexus_test;
use nexus_test::*;

nexus_test!(catch_receives_thrown_message
"
let message = \"\"
try:
{ throw \"boom\"
} catch (e):
{ message = e
}
"
  message == "boom"
);

nexus_test!(thrown_values_are_stringified
"
let message = \"\"
try:
{ throw 1 + 2
} catch (e):
{ message = e
}
"
  message == "3"
);

nexus_test!(catch_skipped_when_no_error
"
let caught = false
let ran = false
try:
{ ran = true
} catch (e):
{ caught = true
}
"
  ran == true
  caught == false
);

nexus_test!(catch_handles_runtime_errors
"
let caught = false
try:
{ let crash = 1 / 0
} catch (e):
{ caught = true
}
"
  caught == true
);

nexus_test!(catch_without_variable
"
let caught = false
try:
{ throw \"x\"
} catch:
{ caught = true
}
"
  caught == true
);

nexus_test!(finally_runs_after_success
"
let order = \"\"
try:
{ order = order + \"try \"
} finally:
{ order = order + \"finally\"
}
"
  order == "try finally"
);

nexus_test!(finally_runs_after_catch
"
let order = \"\"
try:
{ throw \"oops\"
} catch (e):
{ order = order + \"catch \"
} finally:
{ order = order + \"finally\"
}
"
  order == "catch finally"
);

nexus_test!(try_without_catch_still_propagates
"
let ran_finally = false
function risky():
{ try:
  { throw \"bad\"
  } finally:
  { ran_finally = true
  }
}
let caught = \"\"
try:
{ risky()
} catch (e):
{ caught = e
}
"
  ran_finally == true
  caught == "bad"
);

nexus_test!(rethrow_from_catch
"
let outer = \"\"
try:
{ try:
  { throw \"inner\"
  } catch (e):
  { throw \"re: \" + e
  }
} catch (e):
{ outer = e
}
"
  outer == "re: inner"
);

nexus_test!(finally_error_replaces_in_flight_error
"
let caught = \"\"
try:
{ try:
  { throw \"original\"
  } finally:
  { throw \"replacement\"
  }
} catch (e):
{ caught = e
}
"
  caught == "replacement"
);

nexus_test!(finally_runs_when_return_unwinds
"
let cleaned = false
function work():
{ try:
  { return \"value\"
  } finally:
  { cleaned = true
  }
}
let result = work()
"
  cleaned == true
  result == "value"
);

nexus_test!(finally_runs_when_break_unwinds
"
let cleaned = 0
let i = 0
while i < 5:
{ i = i + 1
  try:
  { break
  } finally:
  { cleaned = cleaned + 1
  }
}
"
  cleaned == 1.0
  i == 1.0
);

nexus_test!(catch_does_not_absorb_return
"
function work():
{ try:
  { return 1
  } catch (e):
  { return 2
  }
}
let result = work()
"
  result == 1.0
);

nexus_test!(uncaught_throw_is_a_runtime_error
"
throw \"unhandled\"
"
  RuntimeError
);

nexus_test!(catch_variable_is_scoped_to_the_catch_block
"
try:
{ throw \"x\"
} catch (e):
{ e
}
let crash = e
"
  RuntimeError
);

nexus_test!(nested_try_rethrows_to_outer
"
let trail = \"\"
try:
{ try:
  { throw \"deep\"
  } finally:
  { trail = trail + \"inner-finally \"
  }
} catch (e):
{ trail = trail + \"outer-catch:\" + e
}
"
  trail == "inner-finally outer-catch:deep"
);
